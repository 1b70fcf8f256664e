//! Turning input arguments into paths and requests.

use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use pdfshape::error::{PdfShapeError, Result};
use pdfshape::request::TransformRequest;

/// Expand arguments and append any input-list entries.
///
/// # Errors
///
/// Returns an error if a glob pattern is malformed or matches nothing, or
/// the input list cannot be read.
pub async fn collect_inputs(patterns: &[String], input_list: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut inputs = expand_patterns(patterns)?;

    if let Some(list) = input_list {
        inputs.extend(read_input_list(list).await?);
    }

    Ok(inputs)
}

/// Expand glob patterns into paths, in argument order.
///
/// An argument without glob metacharacters is kept as a literal path so a
/// missing file is reported as such later.
pub fn expand_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        if !pattern.contains(['*', '?', '[']) {
            resolved_paths.push(PathBuf::from(pattern));
            continue;
        }

        let paths = glob::glob(pattern).map_err(|err| {
            PdfShapeError::invalid_request(format!("Invalid pattern '{pattern}': {err}"))
        })?;

        let before = resolved_paths.len();
        for entry in paths {
            let path = entry.map_err(|err| PdfShapeError::other(err.to_string()))?;
            resolved_paths.push(path);
        }

        if resolved_paths.len() == before {
            return Err(PdfShapeError::invalid_request(format!(
                "No files match '{pattern}'"
            )));
        }
    }

    Ok(resolved_paths)
}

/// Read input paths from a file, or stdin for `-`.
///
/// Lines starting with '#' are comments. Empty lines are skipped.
pub async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    let to_error = |source| PdfShapeError::FailedToReadInputList {
        path: path.to_path_buf(),
        source,
    };

    if path.as_os_str() == "-" {
        let reader = BufReader::new(tokio::io::stdin());
        return parse_input_list(reader).await.map_err(to_error);
    }

    let file = tokio::fs::File::open(path).await.map_err(to_error)?;
    parse_input_list(BufReader::new(file))
        .await
        .map_err(to_error)
}

async fn parse_input_list<R>(reader: R) -> std::io::Result<Vec<PathBuf>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut paths = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        paths.push(PathBuf::from(line));
    }

    Ok(paths)
}

/// Read a JSON transform request.
pub async fn read_request(path: &Path) -> Result<TransformRequest> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PdfShapeError::file_not_found(path.to_path_buf())
        } else {
            PdfShapeError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    serde_json::from_str(&text).map_err(|e| {
        PdfShapeError::invalid_request(format!(
            "Invalid request in {}: {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfshape::request::SplitMode;
    use tempfile::TempDir;

    #[test]
    fn test_literal_paths_are_kept() {
        let paths = expand_patterns(["missing.pdf", "b.pdf"]).unwrap();
        assert_eq!(paths, [PathBuf::from("missing.pdf"), PathBuf::from("b.pdf")]);
    }

    #[test]
    fn test_glob_expands_sorted() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["ch2.pdf", "ch1.pdf", "notes.txt"] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }

        let pattern = format!("{}/*.pdf", temp_dir.path().display());
        let paths = expand_patterns([pattern]).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["ch1.pdf", "ch2.pdf"]);
    }

    #[test]
    fn test_glob_without_matches_fails() {
        let temp_dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.pdf", temp_dir.path().display());
        assert!(expand_patterns([pattern]).is_err());
    }

    #[tokio::test]
    async fn test_input_list_skips_comments() {
        let temp_dir = TempDir::new().unwrap();
        let list = temp_dir.path().join("inputs.txt");
        std::fs::write(&list, "# chapters\na.pdf\n\n  b.pdf  \n").unwrap();

        let inputs = collect_inputs(&["first.pdf".to_string()], Some(list.as_path()))
            .await
            .unwrap();
        assert_eq!(
            inputs,
            [
                PathBuf::from("first.pdf"),
                PathBuf::from("a.pdf"),
                PathBuf::from("b.pdf")
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_input_list() {
        let err = read_input_list(Path::new("/nonexistent/list.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfShapeError::FailedToReadInputList { .. }));
    }

    #[tokio::test]
    async fn test_read_request() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"operation": "split", "mode": "all_individually"}"#,
        )
        .unwrap();

        let request = read_request(&path).await.unwrap();
        assert_eq!(
            request,
            TransformRequest::Split {
                mode: SplitMode::AllIndividually
            }
        );
    }

    #[tokio::test]
    async fn test_read_malformed_request() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("request.json");
        std::fs::write(&path, r#"{"operation": "explode"}"#).unwrap();

        let err = read_request(&path).await.unwrap_err();
        assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
    }
}
