//! Writes the IDs of created resources so later tooling can find them.

use crate::provision::Deployment;
use snafu::ResultExt;
use std::fs;
use std::path::Path;

/// Writes the deployment as pretty-printed JSON, replacing anything already at `path`.
pub(crate) fn write_deployment(path: &Path, deployment: &Deployment) -> Result<()> {
    let json = serde_json::to_string_pretty(deployment).context(error::SerializeSnafu)?;
    fs::write(path, json).context(error::FileWriteSnafu { path })
}

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(crate) enum Error {
        #[snafu(display("Failed to serialize deployment output: {}", source))]
        Serialize { source: serde_json::Error },

        #[snafu(display("Failed to write file at '{}': {}", path.display(), source))]
        FileWrite { path: PathBuf, source: io::Error },
    }
}
pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
mod test {
    use super::write_deployment;
    use crate::provision::Deployment;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;
    use std::fs;

    fn deployment() -> Deployment {
        Deployment {
            application_id: "A1".to_string(),
            index_id: "I1".to_string(),
            data_source_id: "D1".to_string(),
            execution_id: "E1".to_string(),
        }
    }

    #[test]
    fn writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment_output.json");
        write_deployment(&path, &deployment()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("{\n  \"applicationId\": \"A1\","));
        let actual: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_json_eq!(
            actual,
            json!({
                "applicationId": "A1",
                "indexId": "I1",
                "dataSourceId": "D1",
                "executionId": "E1"
            })
        );
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment_output.json");
        fs::write(
            &path,
            "{\"applicationId\": \"old\", \"extra\": \"a much longer stale value that would linger\"}",
        )
        .unwrap();

        write_deployment(&path, &deployment()).unwrap();

        let actual: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_json_eq!(
            actual,
            json!({
                "applicationId": "A1",
                "indexId": "I1",
                "dataSourceId": "D1",
                "executionId": "E1"
            })
        );
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("deployment_output.json");
        let err = write_deployment(&path, &deployment()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to write file at"));
    }
}
