use std::fs::{self, create_dir_all};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::Context;

pub fn ensure_dir_exists(p: &Path) -> io::Result<()> {
    if p.exists() {
        return Ok(());
    }

    create_dir_all(p)
}

/// Calls `to_str` on the path and returns the string, panicking if that fails
pub fn path_must_str(path: &Path) -> &str {
    path.to_str().expect("valid paths")
}

/// Resolve a path found in the project config: absolute paths are kept,
/// relative ones are taken from `APPOPS_PROJECT_HOME`
pub fn project_relative(ctx: &dyn Context, path: &str) -> crate::Result<PathBuf> {
    let as_path = Path::new(path);
    if as_path.is_absolute() {
        return Ok(as_path.to_path_buf());
    }
    Ok(ctx.get_project_dir()?.join(as_path))
}

pub fn read_file(path: &Path) -> crate::Result<String> {
    match fs::read_to_string(path) {
        Ok(v) => Ok(v),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Err(crate::Error::MissingFile(path_must_str(path).into())),
            _ => Err(e.into()),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{mock_context, tmp_context, MockContext, TestContext};

    use rstest::*;

    #[rstest]
    fn test_project_relative(mut mock_context: MockContext) {
        mock_context
            .expect_get_project_dir()
            .returning(|| Ok("/tmp/project".into()));

        let abs = project_relative(&mock_context, "/etc/whitelist.txt").unwrap();
        assert_eq!(abs, PathBuf::from("/etc/whitelist.txt"));

        let rel = project_relative(&mock_context, "lists/whitelist.txt").unwrap();
        assert_eq!(rel, PathBuf::from("/tmp/project/lists/whitelist.txt"));
    }

    #[rstest]
    fn test_read_missing_file(tmp_context: TestContext) {
        let missing = tmp_context.get_temp_path(Some("txt"));
        match read_file(&missing) {
            Err(crate::Error::MissingFile(name)) => {
                assert_eq!(name.as_str(), path_must_str(&missing))
            }
            other => panic!("expected MissingFile, got {other:?}"),
        }
    }
}
