//! Canonical description of a code symbol (spec §3 `Symbol`).

use serde::{Deserialize, Serialize};

/// Classification of a [`Symbol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Type,
    Struct,
    Class,
    Interface,
    Enum,
    Constant,
    Variable,
    Package,
    Import,
    Unknown,
}

impl SymbolKind {
    /// Parses a kind name, falling back to `Unknown` for anything
    /// unrecognized (tool parameter parsing never hard-fails on enum
    /// values per spec §4.3: "unknown enum values fall back to the
    /// default").
    pub fn parse_or_unknown(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "type" => SymbolKind::Type,
            "struct" => SymbolKind::Struct,
            "class" => SymbolKind::Class,
            "interface" => SymbolKind::Interface,
            "enum" => SymbolKind::Enum,
            "constant" => SymbolKind::Constant,
            "variable" => SymbolKind::Variable,
            "package" => SymbolKind::Package,
            "import" => SymbolKind::Import,
            _ => SymbolKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Type => "type",
            SymbolKind::Struct => "struct",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::Constant => "constant",
            SymbolKind::Variable => "variable",
            SymbolKind::Package => "package",
            SymbolKind::Import => "import",
            SymbolKind::Unknown => "unknown",
        }
    }
}

/// A single code symbol, the node payload of the frozen graph.
///
/// `id` is conventionally `<file>:<start-line>:<name>` and must be unique
/// within a graph (spec §3, §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub package: String,
    pub signature: Option<String>,
    pub exported: bool,
    pub language: String,
}

impl Symbol {
    /// Builds the canonical id for a symbol (forward-slash-normalized file
    /// path, per spec §6).
    pub fn make_id(file_path: &str, start_line: usize, name: &str) -> String {
        format!("{}:{}:{}", file_path.replace('\\', "/"), start_line, name)
    }

    /// Validates the invariants spec §3 requires of every `Symbol`:
    /// non-empty `id`/`name`/`file_path`/`language`, `start_line >= 1`,
    /// `end_line >= start_line`.
    pub fn validate(&self) -> Result<(), crate::error::IndexError> {
        use crate::error::IndexError;
        if self.id.is_empty() {
            return Err(IndexError::EmptyId);
        }
        if self.name.is_empty() {
            return Err(IndexError::EmptyName);
        }
        if self.file_path.is_empty() {
            return Err(IndexError::EmptyFile);
        }
        if self.language.is_empty() {
            return Err(IndexError::EmptyLanguage);
        }
        if self.start_line < 1 {
            return Err(IndexError::InvalidStartLine(self.start_line));
        }
        if self.end_line < self.start_line {
            return Err(IndexError::EndBeforeStart {
                start: self.start_line,
                end: self.end_line,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> Symbol {
        Symbol {
            id: id.to_string(),
            name: "Setup".to_string(),
            kind: SymbolKind::Function,
            file_path: "pkg/a/setup.go".to_string(),
            start_line: 10,
            end_line: 20,
            package: "a".to_string(),
            signature: None,
            exported: true,
            language: "go".to_string(),
        }
    }

    #[test]
    fn make_id_normalizes_separators() {
        let id = Symbol::make_id("pkg\\a\\setup.go", 10, "Setup");
        assert_eq!(id, "pkg/a/setup.go:10:Setup");
    }

    #[test]
    fn validate_rejects_empty_fields() {
        let mut s = sample("x:1:Setup");
        s.id = String::new();
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_lines() {
        let mut s = sample("x:1:Setup");
        s.start_line = 0;
        assert!(s.validate().is_err());

        let mut s = sample("x:1:Setup");
        s.end_line = 5;
        s.start_line = 10;
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_symbol() {
        assert!(sample("pkg/a/setup.go:10:Setup").validate().is_ok());
    }

    #[test]
    fn kind_parse_falls_back_to_unknown() {
        assert_eq!(SymbolKind::parse_or_unknown("bogus"), SymbolKind::Unknown);
        assert_eq!(SymbolKind::parse_or_unknown("Function"), SymbolKind::Function);
    }
}
