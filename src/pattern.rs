//! 파일 탐색 모듈
//!
//! 폴더에서 JSON 파일을 찾고, glob 패턴으로 파일 이름을 거릅니다.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{JcsvError, Result};

/// 컴파일된 패턴 매처
#[derive(Debug, Default)]
pub struct PatternMatcher {
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `pattern` - 글로브 패턴 문자열 (None이면 모든 파일 매칭)
    ///
    /// # Examples
    /// ```
    /// use jcsv::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("users_*".to_string())).unwrap();
    /// assert!(matcher.matches("users_2024.json"));
    /// assert!(!matcher.matches("orders.json"));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => Some(
                Pattern::new(p)
                    .map_err(|_| JcsvError::InvalidPattern { pattern: p.clone() })?,
            ),
            None => None,
        };

        Ok(Self { pattern: compiled })
    }

    /// 파일 이름이 패턴과 일치하는지 확인 (패턴이 없으면 항상 true)
    pub fn matches(&self, file_name: &str) -> bool {
        match &self.pattern {
            Some(p) => p.matches(file_name),
            None => true,
        }
    }
}

/// 폴더에서 `.json` 파일 수집
///
/// 확장자는 대소문자를 구분하지 않으며, 결과는 파일 이름 순으로 정렬됩니다.
///
/// # Arguments
/// * `dir` - 탐색할 폴더
/// * `max_depth` - 최대 탐색 깊이 (1이면 폴더 바로 아래 파일만)
/// * `matcher` - 파일 이름 필터
pub fn collect_json_files(
    dir: &Path,
    max_depth: usize,
    matcher: &PatternMatcher,
) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(JcsvError::FileOpenError {
            file: dir.to_path_buf(),
            reason: "폴더가 아닙니다".to_string(),
        });
    }

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| matcher.matches(s))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    tracing::debug!(dir = %dir.display(), count = files.len(), "collected JSON files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_pattern_matcher_with_wildcard() {
        let matcher = PatternMatcher::new(Some("*_users_*".to_string())).unwrap();
        assert!(matcher.matches("2024_users_1.json"));
        assert!(!matcher.matches("users.json"));
    }

    #[test]
    fn test_pattern_matcher_none() {
        let matcher = PatternMatcher::new(None).unwrap();
        assert!(matcher.matches("anything.json"));
    }

    #[test]
    fn test_pattern_matcher_invalid() {
        let result = PatternMatcher::new(Some("[invalid".to_string()));
        assert!(matches!(result, Err(JcsvError::InvalidPattern { .. })));
    }

    #[test]
    fn test_collect_json_files_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("a.JSON"), "{}").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("c.json"), "{}").unwrap();

        let files = collect_json_files(temp_dir.path(), 1, &PatternMatcher::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, ["a.JSON", "b.json"]);
    }

    #[test]
    fn test_collect_json_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("c.json"), "{}").unwrap();

        let files = collect_json_files(temp_dir.path(), 2, &PatternMatcher::default()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_collect_json_files_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.json");
        fs::write(&file, "{}").unwrap();

        assert!(collect_json_files(&file, 1, &PatternMatcher::default()).is_err());
    }
}
