//! # Validator
//!
//! The predicate language deciding a menu's visibility and enablement. A
//! validator is a bundle of independent, optional criteria evaluated against
//! the current selection; each criterion can be inverted individually through
//! the `inverse` specifier. The overall result is the logical AND of every
//! configured criterion.

use crate::core::properties::PropertyStore;
use crate::core::selection::SelectionContext;
use crate::system::fs::{DriveKind, FileSystemProbe};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use thiserror::Error;

/// Criterion name accepted by the `inverse` specifier.
pub const CRITERION_MAXFILES: &str = "maxfiles";
pub const CRITERION_MAXFOLDERS: &str = "maxfolders";
pub const CRITERION_PROPERTIES: &str = "properties";
pub const CRITERION_FILEEXTENSIONS: &str = "fileextensions";
pub const CRITERION_EXISTS: &str = "exists";
pub const CRITERION_CLASS: &str = "class";
pub const CRITERION_PATTERN: &str = "pattern";

/// Sentinel token inversing every criterion at once.
const INVERSE_ALL: &str = "all";

/// Errors raised when a criterion's raw value cannot be parsed.
///
/// These fire at configuration time; `validate` itself never fails.
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Unknown class token '{0}'.")]
    UnknownClassToken(String),
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// One token of the `class` criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassToken {
    File,
    Folder,
    Drive,
    DriveFixed,
    DriveNetwork,
    /// Leading-dot token; matches by file extension, case-insensitive.
    Extension(String),
}

impl ClassToken {
    fn parse(token: &str) -> Result<Self, ValidatorError> {
        match token {
            "file" => Ok(Self::File),
            "folder" => Ok(Self::Folder),
            "drive" => Ok(Self::Drive),
            "drive:fixed" => Ok(Self::DriveFixed),
            "drive:network" => Ok(Self::DriveNetwork),
            _ if token.starts_with('.') && token.len() > 1 => {
                Ok(Self::Extension(token.get(1..).unwrap_or("").to_lowercase()))
            }
            _ => Err(ValidatorError::UnknownClassToken(token.to_string())),
        }
    }
}

/// Compiled `pattern` criterion: the matcher plus the raw patterns for
/// display.
#[derive(Debug, Clone)]
struct PatternSet {
    matcher: GlobSet,
    raw: Vec<String>,
}

/// Splits a `;`-separated criterion value, dropping empty tokens from
/// trailing or doubled separators.
fn split_tokens(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Visibility/enablement predicate over a selection snapshot.
///
/// A default validator has no criteria and validates true for any context.
/// The count criteria (`maxfiles`, `maxfolders`) default to unbounded and
/// always participate; every other criterion only participates once its
/// setter has been called.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    max_files: Option<usize>,
    max_directories: Option<usize>,
    properties: Option<Vec<String>>,
    file_extensions: Option<Vec<String>>,
    file_exists: Option<Vec<String>>,
    classes: Option<Vec<ClassToken>>,
    patterns: Option<PatternSet>,
    inversed: HashSet<String>,
    inverse_all: bool,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on the selection's file count. Unset means unbounded.
    pub fn set_max_files(&mut self, max_files: usize) {
        self.max_files = Some(max_files);
    }

    /// Upper bound on the selection's directory count. Unset means unbounded.
    pub fn set_max_directories(&mut self, max_directories: usize) {
        self.max_directories = Some(max_directories);
    }

    /// `;`-separated property names that must all exist in the store.
    pub fn set_properties(&mut self, properties: &str) {
        self.properties = Some(split_tokens(properties));
    }

    /// `;`-separated extensions every selected element must carry
    /// (case-insensitive).
    pub fn set_file_extensions(&mut self, file_extensions: &str) {
        let tokens = split_tokens(file_extensions)
            .iter()
            .map(|token| token.to_lowercase())
            .collect();
        self.file_extensions = Some(tokens);
    }

    /// `;`-separated paths that must all exist on the filesystem.
    pub fn set_file_exists(&mut self, file_exists: &str) {
        self.file_exists = Some(split_tokens(file_exists));
    }

    /// `;`-separated class tokens; fails on an unknown token.
    pub fn set_class(&mut self, class: &str) -> Result<(), ValidatorError> {
        let tokens = split_tokens(class)
            .iter()
            .map(|token| ClassToken::parse(token))
            .collect::<Result<Vec<ClassToken>, ValidatorError>>()?;
        self.classes = Some(tokens);
        Ok(())
    }

    /// `;`-separated glob patterns; compiled here, fails on a malformed glob.
    ///
    /// `*` crosses path separators and `\` is a literal character, so
    /// patterns like `*cmd.exe` match whole Windows paths.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<(), ValidatorError> {
        let raw = split_tokens(pattern);
        let mut builder = GlobSetBuilder::new();
        for token in &raw {
            let glob = GlobBuilder::new(token)
                .literal_separator(false)
                .backslash_escape(false)
                .build()
                .map_err(|source| ValidatorError::InvalidPattern {
                    pattern: token.clone(),
                    source,
                })?;
            builder.add(glob);
        }
        let matcher = builder
            .build()
            .map_err(|source| ValidatorError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        self.patterns = Some(PatternSet { matcher, raw });
        Ok(())
    }

    /// Parses the inverse specifier: criterion names separated by `;` or `,`,
    /// or the literal `all`. Parsed once here; [`Self::is_inversed`] is a set
    /// lookup.
    pub fn set_inverse(&mut self, specifier: &str) {
        self.inversed.clear();
        self.inverse_all = false;
        for token in specifier.split([';', ',']) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if token == INVERSE_ALL {
                self.inverse_all = true;
            } else {
                self.inversed.insert(token.to_string());
            }
        }
    }

    /// True when the named criterion's result must be flipped. Exact-token
    /// match only.
    pub fn is_inversed(&self, criterion: &str) -> bool {
        self.inverse_all || self.inversed.contains(criterion)
    }

    /// Evaluates every configured criterion against the selection snapshot.
    ///
    /// Short-circuits on the first failing criterion; never fails itself.
    pub fn validate(
        &self,
        context: &SelectionContext,
        store: &PropertyStore,
        fs: &dyn FileSystemProbe,
    ) -> bool {
        if !self.validate_max_count(
            context.files_count(),
            self.max_files,
            CRITERION_MAXFILES,
        ) {
            return false;
        }
        if !self.validate_max_count(
            context.directories_count(),
            self.max_directories,
            CRITERION_MAXFOLDERS,
        ) {
            return false;
        }
        if !self.validate_properties(store) {
            return false;
        }
        if !self.validate_file_extensions(context) {
            return false;
        }
        if !self.validate_file_exists(fs) {
            return false;
        }
        if !self.validate_class(context) {
            return false;
        }
        if !self.validate_pattern(context) {
            return false;
        }
        true
    }

    /// True when no criterion is configured and nothing is inversed.
    pub fn is_default(&self) -> bool {
        self.max_files.is_none()
            && self.max_directories.is_none()
            && self.properties.is_none()
            && self.file_extensions.is_none()
            && self.file_exists.is_none()
            && self.classes.is_none()
            && self.patterns.is_none()
            && self.inversed.is_empty()
            && !self.inverse_all
    }

    /// One-line description of the configured criteria, for diagnostics.
    pub fn summary(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(max) = self.max_files {
            parts.push(format!("maxfiles={max}"));
        }
        if let Some(max) = self.max_directories {
            parts.push(format!("maxfolders={max}"));
        }
        if let Some(properties) = &self.properties {
            parts.push(format!("properties={}", properties.join(";")));
        }
        if let Some(extensions) = &self.file_extensions {
            parts.push(format!("fileextensions={}", extensions.join(";")));
        }
        if let Some(paths) = &self.file_exists {
            parts.push(format!("exists={}", paths.join(";")));
        }
        if let Some(classes) = &self.classes {
            parts.push(format!("class={} token(s)", classes.len()));
        }
        if let Some(patterns) = &self.patterns {
            parts.push(format!("pattern={}", patterns.raw.join(";")));
        }
        if self.inverse_all {
            parts.push("inverse=all".to_string());
        } else if !self.inversed.is_empty() {
            let mut names: Vec<&str> = self.inversed.iter().map(String::as_str).collect();
            names.sort_unstable();
            parts.push(format!("inverse={}", names.join(";")));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Count criteria pass when `count <= bound`; inversed when
    /// `count > bound`. An inversed unbounded criterion can never pass.
    fn validate_max_count(&self, count: usize, bound: Option<usize>, criterion: &str) -> bool {
        let passed = match (bound, self.is_inversed(criterion)) {
            (Some(max), false) => count <= max,
            (Some(max), true) => count > max,
            (None, false) => true,
            (None, true) => false,
        };
        if !passed {
            log::debug!("criterion '{criterion}' rejected the selection (count {count})");
        }
        passed
    }

    /// Every named property must exist; inversed: every one must be absent
    /// or empty.
    fn validate_properties(&self, store: &PropertyStore) -> bool {
        let Some(properties) = &self.properties else {
            return true;
        };
        let inversed = self.is_inversed(CRITERION_PROPERTIES);
        let passed = if inversed {
            properties
                .iter()
                .all(|name| !store.has_property(name) || store.get_property(name).is_empty())
        } else {
            properties.iter().all(|name| store.has_property(name))
        };
        if !passed {
            log::debug!("criterion 'properties' rejected the selection (inversed={inversed})");
        }
        passed
    }

    /// Every element's extension must be in the configured set; inversed: no
    /// element's extension may be.
    fn validate_file_extensions(&self, context: &SelectionContext) -> bool {
        let Some(accepted) = &self.file_extensions else {
            return true;
        };
        let inversed = self.is_inversed(CRITERION_FILEEXTENSIONS);
        let passed = if inversed {
            context
                .elements()
                .iter()
                .all(|element| !accepted.contains(&element.extension().to_lowercase()))
        } else {
            context
                .elements()
                .iter()
                .all(|element| accepted.contains(&element.extension().to_lowercase()))
        };
        if !passed {
            log::debug!("criterion 'fileextensions' rejected the selection (inversed={inversed})");
        }
        passed
    }

    /// Every listed path must exist; inversed: none may exist.
    fn validate_file_exists(&self, fs: &dyn FileSystemProbe) -> bool {
        let Some(paths) = &self.file_exists else {
            return true;
        };
        let inversed = self.is_inversed(CRITERION_EXISTS);
        let passed = if inversed {
            paths.iter().all(|path| !fs.path_exists(path))
        } else {
            paths.iter().all(|path| fs.path_exists(path))
        };
        if !passed {
            log::debug!("criterion 'exists' rejected the selection (inversed={inversed})");
        }
        passed
    }

    /// At least one element must match at least one class token (OR-OR);
    /// inversed flips the result.
    fn validate_class(&self, context: &SelectionContext) -> bool {
        let Some(classes) = &self.classes else {
            return true;
        };
        let inversed = self.is_inversed(CRITERION_CLASS);
        let matched = context.elements().iter().any(|element| {
            classes.iter().any(|token| match token {
                ClassToken::File => element.is_file,
                ClassToken::Folder => element.is_directory,
                ClassToken::Drive => element.drive.is_some(),
                ClassToken::DriveFixed => element.drive == Some(DriveKind::Fixed),
                ClassToken::DriveNetwork => element.drive == Some(DriveKind::Network),
                ClassToken::Extension(extension) => {
                    element.extension().eq_ignore_ascii_case(extension)
                }
            })
        });
        let passed = if inversed { !matched } else { matched };
        if !passed {
            log::debug!("criterion 'class' rejected the selection (inversed={inversed})");
        }
        passed
    }

    /// Every element must match at least one pattern; inversed: no element
    /// may match any pattern.
    fn validate_pattern(&self, context: &SelectionContext) -> bool {
        let Some(patterns) = &self.patterns else {
            return true;
        };
        let inversed = self.is_inversed(CRITERION_PATTERN);
        let passed = if inversed {
            context
                .elements()
                .iter()
                .all(|element| !patterns.matcher.is_match(&element.path))
        } else {
            context
                .elements()
                .iter()
                .all(|element| patterns.matcher.is_match(&element.path))
        };
        if !passed {
            log::debug!("criterion 'pattern' rejected the selection (inversed={inversed})");
        }
        passed
    }
}
