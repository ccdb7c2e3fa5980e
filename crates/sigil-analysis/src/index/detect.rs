//! Lightweight code element detection.
//!
//! Regex-level, per language family. This feeds comment-block
//! partitioning and the call graph seeds; it is intentionally not a full
//! parser, so dynamic constructs simply go undetected.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::SymbolType;
use crate::comments::Language;

/// A detected code element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeElement {
    /// Dotted symbol path, e.g. `Billing.charge` for a method.
    pub path: String,
    /// Simple name.
    pub name: String,
    pub kind: SymbolType,
    /// 1-indexed declaration line.
    pub line: usize,
    /// End line (inclusive): the line before the next sibling, else EOF.
    pub end_line: usize,
    pub exported: bool,
    /// Declaration line, trimmed.
    pub signature: String,
}

/// One raw match before nesting resolution.
struct RawElement {
    name: String,
    kind: SymbolType,
    line: usize,
    indent: usize,
    exported: bool,
    signature: String,
    /// Class-like elements open a scope that dotted paths nest under.
    opens_scope: bool,
}

static RUST_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});
static RUST_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});
static RUST_CONST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(pub(?:\([^)]*\))?\s+)?(?:const|static)\s+([A-Z_][A-Za-z0-9_]*)\s*:").unwrap()
});
static RUST_IMPL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)impl(?:<[^>]*>)?\s+(?:[A-Za-z_][\w:<>, ]*\s+for\s+)?([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

static PY_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static PY_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)class\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static PY_CONST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^()([A-Z][A-Z0-9_]*)\s*=").unwrap());

static GO_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^()func\s+(?:\(\s*\w+\s+\*?([A-Za-z_][A-Za-z0-9_]*)\s*\)\s+)?([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});
static GO_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^()type\s+([A-Za-z_][A-Za-z0-9_]*)\s+(?:struct|interface)").unwrap());

static CURLY_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()
});
static CURLY_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(export\s+|public\s+|internal\s+|open\s+)?(?:default\s+)?(?:abstract\s+|final\s+|sealed\s+)?class\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()
});
static CURLY_CONST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(export\s+)?const\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=").unwrap()
});
static CURLY_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(?:(?:public|private|protected|static|async|override|final)\s+)*([A-Za-z_$][A-Za-z0-9_$]*)\s*\([^;]*\)\s*(?::\s*[\w<>,\[\] ]+\s*)?\{").unwrap()
});
static RUBY_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)def\s+(?:self\.)?([A-Za-z_][A-Za-z0-9_?!]*)").unwrap());
static RUBY_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(?:class|module)\s+([A-Z][A-Za-z0-9_]*)").unwrap());

/// Keywords that look like `name(...) {` but are control flow.
const METHOD_BLACKLIST: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "else", "do", "new", "function", "match",
];

/// Detect all code elements in `content`.
pub fn detect_elements(content: &str, language: Language) -> Vec<CodeElement> {
    let raw = match language {
        Language::Rust => detect_rust(content),
        Language::Python => detect_indent_family(content),
        Language::Ruby => detect_ruby(content),
        Language::Go => detect_go(content),
        _ => detect_curly_family(content),
    };
    let mut elements = resolve_nesting(raw);
    let lines: Vec<&str> = content.lines().collect();
    for element in &mut elements {
        element.end_line = compute_end(&lines, element.line, language);
    }
    elements
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Compute where an element's body ends.
///
/// Curly-brace languages: brace balance from the declaration line.
/// Indentation languages: the line before the first non-blank line at the
/// declaration's indent or shallower (Ruby's `end` terminator included).
fn compute_end(lines: &[&str], start: usize, language: Language) -> usize {
    match language {
        Language::Python | Language::Ruby => {
            let indent = lines.get(start - 1).map(|l| indent_of(l)).unwrap_or(0);
            for (idx, line) in lines.iter().enumerate().skip(start) {
                if line.trim().is_empty() {
                    continue;
                }
                if indent_of(line) <= indent {
                    if language == Language::Ruby && line.trim() == "end" {
                        return idx + 1;
                    }
                    return idx.max(start);
                }
            }
            lines.len()
        }
        _ => {
            let mut depth: i32 = 0;
            let mut seen_open = false;
            for (idx, line) in lines.iter().enumerate().skip(start - 1) {
                for ch in line.chars() {
                    match ch {
                        '{' => {
                            depth += 1;
                            seen_open = true;
                        }
                        '}' => depth -= 1,
                        _ => {}
                    }
                }
                if seen_open && depth <= 0 {
                    return idx + 1;
                }
                // Braceless declarations (`struct Engine;`, `const X = 1;`)
                // end at their terminating semicolon.
                if !seen_open && line.trim_end().ends_with(';') {
                    return idx + 1;
                }
            }
            lines.len()
        }
    }
}

fn detect_rust(content: &str) -> Vec<RawElement> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(caps) = RUST_TYPE.captures(line) {
            out.push(raw(&caps, 3, SymbolType::Class, idx + 1, line, caps.get(2).is_some(), true));
        } else if let Some(caps) = RUST_FN.captures(line) {
            out.push(raw(&caps, 3, SymbolType::Function, idx + 1, line, caps.get(2).is_some(), false));
        } else if let Some(caps) = RUST_CONST.captures(line) {
            out.push(raw(&caps, 3, SymbolType::Const, idx + 1, line, caps.get(2).is_some(), false));
        } else if let Some(caps) = RUST_IMPL.captures(line) {
            // impl blocks open a scope for method dotting but are not
            // elements themselves.
            out.push(RawElement {
                name: caps.get(2).unwrap().as_str().to_string(),
                kind: SymbolType::Class,
                line: idx + 1,
                indent: caps.get(1).unwrap().as_str().len(),
                exported: false,
                signature: String::new(),
                opens_scope: true,
            });
        }
    }
    out
}

fn detect_indent_family(content: &str) -> Vec<RawElement> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(caps) = PY_CLASS.captures(line) {
            out.push(raw_named(&caps, 2, SymbolType::Class, idx + 1, line, true));
        } else if let Some(caps) = PY_DEF.captures(line) {
            out.push(raw_named(&caps, 2, SymbolType::Function, idx + 1, line, false));
        } else if let Some(caps) = PY_CONST.captures(line) {
            out.push(raw_named(&caps, 2, SymbolType::Const, idx + 1, line, false));
        }
    }
    out
}

fn detect_ruby(content: &str) -> Vec<RawElement> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(caps) = RUBY_CLASS.captures(line) {
            out.push(raw_named(&caps, 2, SymbolType::Class, idx + 1, line, true));
        } else if let Some(caps) = RUBY_DEF.captures(line) {
            out.push(raw_named(&caps, 2, SymbolType::Function, idx + 1, line, false));
        }
    }
    out
}

fn detect_go(content: &str) -> Vec<RawElement> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(caps) = GO_TYPE.captures(line) {
            let name = caps.get(2).unwrap().as_str();
            out.push(RawElement {
                name: name.to_string(),
                kind: SymbolType::Class,
                line: idx + 1,
                indent: 0,
                exported: name.chars().next().is_some_and(|c| c.is_uppercase()),
                signature: line.trim().to_string(),
                opens_scope: false,
            });
        } else if let Some(caps) = GO_FUNC.captures(line) {
            let receiver = caps.get(2).map(|m| m.as_str().to_string());
            let name = caps.get(3).unwrap().as_str().to_string();
            let exported = name.chars().next().is_some_and(|c| c.is_uppercase());
            out.push(RawElement {
                kind: if receiver.is_some() {
                    SymbolType::Method
                } else {
                    SymbolType::Function
                },
                name: match receiver {
                    // Methods carry their receiver in the dotted path.
                    Some(recv) => format!("{recv}.{name}"),
                    None => name,
                },
                line: idx + 1,
                indent: 0,
                exported,
                signature: line.trim().to_string(),
                opens_scope: false,
            });
        }
    }
    out
}

fn detect_curly_family(content: &str) -> Vec<RawElement> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(caps) = CURLY_CLASS.captures(line) {
            out.push(raw(&caps, 3, SymbolType::Class, idx + 1, line, caps.get(2).is_some(), true));
        } else if let Some(caps) = CURLY_FUNCTION.captures(line) {
            out.push(raw(&caps, 3, SymbolType::Function, idx + 1, line, caps.get(2).is_some(), false));
        } else if let Some(caps) = CURLY_CONST.captures(line) {
            let kind = if line.contains("=>") || line.contains("function") {
                SymbolType::Function
            } else {
                SymbolType::Const
            };
            out.push(raw(&caps, 3, kind, idx + 1, line, caps.get(2).is_some(), false));
        } else if let Some(caps) = CURLY_METHOD.captures(line) {
            let name = caps.get(2).unwrap().as_str();
            let indent = caps.get(1).unwrap().as_str().len();
            // Methods only make sense nested inside a class body.
            if indent > 0 && !METHOD_BLACKLIST.contains(&name) {
                out.push(RawElement {
                    name: name.to_string(),
                    kind: SymbolType::Method,
                    line: idx + 1,
                    indent,
                    exported: true,
                    signature: line.trim().to_string(),
                    opens_scope: false,
                });
            }
        }
    }
    out
}

fn raw(
    caps: &regex::Captures<'_>,
    name_group: usize,
    kind: SymbolType,
    line_no: usize,
    line: &str,
    exported: bool,
    opens_scope: bool,
) -> RawElement {
    RawElement {
        name: caps.get(name_group).unwrap().as_str().to_string(),
        kind,
        line: line_no,
        indent: caps.get(1).unwrap().as_str().len(),
        exported,
        signature: line.trim().to_string(),
        opens_scope,
    }
}

fn raw_named(
    caps: &regex::Captures<'_>,
    name_group: usize,
    kind: SymbolType,
    line_no: usize,
    line: &str,
    opens_scope: bool,
) -> RawElement {
    let name = caps.get(name_group).unwrap().as_str().to_string();
    let exported = !name.starts_with('_');
    RawElement {
        name,
        kind,
        line: line_no,
        indent: caps.get(1).unwrap().as_str().len(),
        exported,
        signature: line.trim().to_string(),
        opens_scope,
    }
}

/// Turn raw matches into dotted elements.
///
/// An element nests under the nearest preceding scope with smaller
/// indentation; a function inside a class scope becomes a method.
fn resolve_nesting(raw: Vec<RawElement>) -> Vec<CodeElement> {
    // (name, indent) of open scopes.
    let mut scopes: Vec<(String, usize)> = Vec::new();
    let mut out: Vec<CodeElement> = Vec::new();

    for element in &raw {
        while scopes
            .last()
            .is_some_and(|(_, indent)| element.indent <= *indent)
        {
            scopes.pop();
        }

        let inside_scope = !scopes.is_empty();
        let path = if inside_scope && !element.name.contains('.') {
            format!("{}.{}", scopes.last().unwrap().0, element.name)
        } else {
            element.name.clone()
        };

        if element.opens_scope {
            scopes.push((path.clone(), element.indent));
        }

        // Scope-only markers (Rust impl blocks) have no signature.
        if element.signature.is_empty() {
            continue;
        }

        let kind = if element.kind == SymbolType::Function && inside_scope {
            SymbolType::Method
        } else {
            element.kind
        };

        out.push(CodeElement {
            path,
            name: element.name.split('.').next_back().unwrap_or(&element.name).to_string(),
            kind,
            line: element.line,
            end_line: element.line,
            exported: element.exported,
            signature: element.signature.clone(),
        });
    }

    out
}

static IMPORT_TS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*import\s+.*?from\s+['"]([^'"]+)['"]|require\(\s*['"]([^'"]+)['"]\s*\)"#)
        .unwrap()
});
static IMPORT_PY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:from\s+(\S+)\s+import|import\s+([\w.]+))").unwrap());
static IMPORT_RUST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*use\s+([\w:]+)").unwrap());
static IMPORT_GO: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\s*import\s+"([^"]+)""#).unwrap());
static IMPORT_GO_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*(?:\w+\s+)?"([^"]+)"$"#).unwrap());
static IMPORT_JVM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*import\s+([\w.]+)").unwrap());
static IMPORT_CSHARP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*using\s+([\w.]+)\s*;").unwrap());
static IMPORT_PHP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*use\s+([\w\\]+)").unwrap());
static IMPORT_RUBY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*require(?:_relative)?\s+['"]([^'"]+)['"]"#).unwrap());
static IMPORT_C: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*#include\s+["<]([^">]+)[">]"#).unwrap());

/// Detect module import specifiers. Best effort; feeds the domain
/// classifier's import-majority heuristic.
pub fn detect_imports(content: &str, language: Language) -> Vec<String> {
    let mut imports = Vec::new();
    let mut in_go_block = false;

    for line in content.lines() {
        let captured = match language {
            Language::TypeScript | Language::JavaScript => IMPORT_TS
                .captures(line)
                .and_then(|c| c.get(1).or_else(|| c.get(2))),
            Language::Python => IMPORT_PY
                .captures(line)
                .and_then(|c| c.get(1).or_else(|| c.get(2))),
            Language::Rust => IMPORT_RUST.captures(line).and_then(|c| c.get(1)),
            Language::Go => {
                if line.trim_start().starts_with("import (") {
                    in_go_block = true;
                    None
                } else if in_go_block {
                    if line.trim_start().starts_with(')') {
                        in_go_block = false;
                        None
                    } else {
                        IMPORT_GO_BLOCK.captures(line).and_then(|c| c.get(1))
                    }
                } else {
                    IMPORT_GO.captures(line).and_then(|c| c.get(1))
                }
            }
            Language::Java | Language::Kotlin | Language::Swift => {
                IMPORT_JVM.captures(line).and_then(|c| c.get(1))
            }
            Language::CSharp => IMPORT_CSHARP.captures(line).and_then(|c| c.get(1)),
            Language::Php => IMPORT_PHP.captures(line).and_then(|c| c.get(1)),
            Language::Ruby => IMPORT_RUBY.captures(line).and_then(|c| c.get(1)),
            Language::C | Language::Cpp => IMPORT_C.captures(line).and_then(|c| c.get(1)),
        };
        if let Some(m) = captured {
            let spec = m.as_str().to_string();
            if !imports.contains(&spec) {
                imports.push(spec);
            }
        }
    }
    imports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_functions_and_methods() {
        let content = "pub fn top() {}\n\nstruct Engine;\n\nimpl Engine {\n    pub fn start(&self) {}\n}\n";
        let elements = detect_elements(content, Language::Rust);
        let paths: Vec<&str> = elements.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"top"));
        assert!(paths.contains(&"Engine"));
        assert!(paths.contains(&"Engine.start"));
        let start = elements.iter().find(|e| e.path == "Engine.start").unwrap();
        assert_eq!(start.kind, SymbolType::Method);
        assert!(start.exported);
    }

    #[test]
    fn test_python_class_methods_dotted() {
        let content = "class Invoice:\n    def total(self):\n        pass\n\ndef helper():\n    pass\n";
        let elements = detect_elements(content, Language::Python);
        let total = elements.iter().find(|e| e.path == "Invoice.total").unwrap();
        assert_eq!(total.kind, SymbolType::Method);
        let helper = elements.iter().find(|e| e.path == "helper").unwrap();
        assert_eq!(helper.kind, SymbolType::Function);
    }

    #[test]
    fn test_typescript_exports_and_arrows() {
        let content = "export function charge(amount: number) {}\nconst fmt = (x) => x;\nexport const RATE = 0.2;\n";
        let elements = detect_elements(content, Language::TypeScript);
        let charge = elements.iter().find(|e| e.path == "charge").unwrap();
        assert!(charge.exported);
        assert_eq!(
            elements.iter().find(|e| e.path == "fmt").unwrap().kind,
            SymbolType::Function
        );
        assert_eq!(
            elements.iter().find(|e| e.path == "RATE").unwrap().kind,
            SymbolType::Const
        );
    }

    #[test]
    fn test_go_receiver_methods() {
        let content = "func (s *Server) Handle() {}\nfunc main() {}\n";
        let elements = detect_elements(content, Language::Go);
        let handle = elements.iter().find(|e| e.path == "Server.Handle").unwrap();
        assert_eq!(handle.kind, SymbolType::Method);
        assert!(handle.exported);
        assert!(!elements.iter().find(|e| e.path == "main").unwrap().exported);
    }

    #[test]
    fn test_control_flow_is_not_a_method() {
        let content = "class A {\n  run() {\n    if (x) {\n    }\n  }\n}\n";
        let elements = detect_elements(content, Language::TypeScript);
        assert!(elements.iter().any(|e| e.path == "A.run"));
        assert!(!elements.iter().any(|e| e.name == "if"));
    }

    #[test]
    fn test_import_detection() {
        let ts = "import { a } from './billing/util';\nconst b = require('lodash');\n";
        assert_eq!(
            detect_imports(ts, Language::TypeScript),
            vec!["./billing/util", "lodash"]
        );

        let py = "from billing.tax import rate\nimport os\n";
        assert_eq!(
            detect_imports(py, Language::Python),
            vec!["billing.tax", "os"]
        );

        let go = "import (\n\t\"fmt\"\n\tbill \"app/billing\"\n)\n";
        assert_eq!(detect_imports(go, Language::Go), vec!["fmt", "app/billing"]);
    }

    #[test]
    fn test_end_lines_cover_bodies() {
        let content = "def a():\n    pass\n\ndef b():\n    pass\n";
        let elements = detect_elements(content, Language::Python);
        assert_eq!(elements[0].line, 1);
        assert_eq!(elements[0].end_line, 3);
        assert_eq!(elements[1].end_line, 5);
    }
}
