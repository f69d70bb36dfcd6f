// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session entry point.

extern crate alloc;

use alloc::string::String;

use mockspark_store::{MergeOptions, TableInput};

use crate::{Pipeline, PipelineError};

/// Settings applied to every pipeline a [`Session`] creates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Merge options captured by `join`/`merge`.
    pub merge_options: MergeOptions,
}

impl SessionConfig {
    /// Sets the suffixes appended to overlapping non-key columns in joins.
    #[must_use]
    pub fn with_merge_suffixes(
        mut self,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.merge_options.suffixes = (left.into(), right.into());
        self
    }
}

/// Factory for pipelines, shaped like a distributed engine's session object.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: SessionConfig,
}

impl Session {
    /// Creates a session with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with the given configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Builds a pipeline from any supported input shape.
    pub fn create_data_frame(
        &self,
        data: impl Into<TableInput>,
    ) -> Result<Pipeline, PipelineError> {
        let mut pipeline = Pipeline::new(data)?;
        pipeline.set_merge_options(self.config.merge_options.clone());
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use mockspark_store::{JoinKind, Row, Value};

    use super::*;

    #[test]
    fn config_reaches_joins() {
        let config = SessionConfig::default().with_merge_suffixes("_a", "_b");
        let session = Session::with_config(config);
        let mut left = session
            .create_data_frame([Row::from([("k", Value::Int(1)), ("v", 1.into())])])
            .unwrap();
        let right = session
            .create_data_frame([Row::from([("k", Value::Int(1)), ("v", 2.into())])])
            .unwrap();
        left.join(&right, "k", JoinKind::Inner);
        let rows = left.materialize().unwrap();
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["k", "v_a", "v_b"]);
    }

    #[test]
    fn config_is_kept_by_the_session() {
        assert_eq!(Session::new().config(), &SessionConfig::default());
        let config = SessionConfig::default().with_merge_suffixes("_l", "_r");
        let session = Session::with_config(config);
        assert_eq!(
            session.config().merge_options,
            MergeOptions {
                suffixes: ("_l".into(), "_r".into()),
            }
        );
        let df = session.create_data_frame([Row::from([("k", Value::Int(1))])]).unwrap();
        assert_eq!(df.merge_options(), &session.config().merge_options);
    }

    #[test]
    fn create_data_frame_rejects_ragged_input() {
        let err = Session::new()
            .create_data_frame(TableInput::tuples([vec![1, 2], vec![1]]))
            .unwrap_err();
        assert!(
            matches!(err, PipelineError::UnsupportedInput(_)),
            "unexpected error: {err:?}"
        );
    }
}
