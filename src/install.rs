//! Installer: patch a host controller source so it imports and implements `EasyCrud`.
//! Pure text transform; running it on already patched source changes nothing.

use regex::Regex;

pub const IMPORT_LINE: &str = "use easy_crud::EasyCrud;";

#[derive(Clone, Debug)]
pub struct InstallOptions {
    /// Controller type receiving the impl.
    pub controller: String,
    /// Field of the controller holding the `easy_crud::Crud` service.
    pub crud_field: String,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            controller: "Controller".into(),
            crud_field: "crud".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patched {
    pub content: String,
    pub import_added: bool,
    pub impl_added: bool,
}

impl Patched {
    pub fn changed(&self) -> bool {
        self.import_added || self.impl_added
    }
}

fn has_import(source: &str) -> bool {
    Regex::new(r"(?m)^\s*(pub\s+)?use\s+easy_crud::(EasyCrud|\{[^}]*\bEasyCrud\b[^}]*\})\s*;")
        .map(|re| re.is_match(source))
        .unwrap_or(false)
}

fn has_impl(source: &str, controller: &str) -> bool {
    let pattern = format!(
        r"impl\s*(<[^>]*>\s*)?(easy_crud::)?EasyCrud\s+for\s+{}\b",
        regex::escape(controller)
    );
    Regex::new(&pattern)
        .map(|re| re.is_match(source))
        .unwrap_or(false)
}

/// Byte offset where the import goes: before the first top-level `use`, else after inner docs and attributes.
fn import_position(source: &str) -> usize {
    if let Some(m) = Regex::new(r"(?m)^use\s")
        .ok()
        .and_then(|re| re.find(source))
    {
        return m.start();
    }
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//!") || trimmed.starts_with("#![") || trimmed.is_empty() {
            offset += line.len();
        } else {
            break;
        }
    }
    offset
}

fn impl_block(options: &InstallOptions) -> String {
    format!(
        "impl EasyCrud for {} {{\n    fn crud(&self) -> &easy_crud::Crud {{\n        &self.{}\n    }}\n}}\n",
        options.controller, options.crud_field
    )
}

pub fn patch_controller_source(source: &str, options: &InstallOptions) -> Patched {
    let mut content = source.to_string();

    let import_added = !has_import(&content);
    if import_added {
        let at = import_position(&content);
        content.insert_str(at, &format!("{}\n", IMPORT_LINE));
    }

    let impl_added = !has_impl(&content, &options.controller);
    if impl_added {
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push('\n');
        content.push_str(&impl_block(options));
    }

    Patched {
        content,
        import_added,
        impl_added,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROLLER: &str = "//! Base controller.\n\nuse axum::Router;\nuse crate::state::AppState;\n\npub struct Controller {\n    pub crud: easy_crud::Crud,\n}\n";

    #[test]
    fn adds_import_before_first_use_and_appends_impl() {
        let patched = patch_controller_source(CONTROLLER, &InstallOptions::default());
        assert!(patched.import_added && patched.impl_added);
        assert!(patched
            .content
            .starts_with("//! Base controller.\n\nuse easy_crud::EasyCrud;\nuse axum::Router;"));
        assert!(patched
            .content
            .ends_with("impl EasyCrud for Controller {\n    fn crud(&self) -> &easy_crud::Crud {\n        &self.crud\n    }\n}\n"));
    }

    #[test]
    fn patching_is_idempotent() {
        let options = InstallOptions::default();
        let once = patch_controller_source(CONTROLLER, &options);
        let twice = patch_controller_source(&once.content, &options);
        assert!(!twice.changed());
        assert_eq!(twice.content, once.content);
    }

    #[test]
    fn grouped_import_and_qualified_impl_are_recognised() {
        let source = "use easy_crud::{Crud, EasyCrud};\n\nstruct Api { crud: Crud }\n\nimpl easy_crud::EasyCrud for Api {\n    fn crud(&self) -> &Crud { &self.crud }\n}\n";
        let options = InstallOptions {
            controller: "Api".into(),
            ..InstallOptions::default()
        };
        assert!(!patch_controller_source(source, &options).changed());
    }

    #[test]
    fn impl_for_another_type_does_not_count() {
        let source = "use easy_crud::EasyCrud;\n\nimpl EasyCrud for ControllerBase {}\n";
        let patched = patch_controller_source(source, &InstallOptions::default());
        assert!(!patched.import_added);
        assert!(patched.impl_added);
    }

    #[test]
    fn source_without_use_gets_import_after_inner_docs() {
        let source = "//! Controllers.\n#![allow(dead_code)]\n\npub struct Controller { crud: easy_crud::Crud }";
        let patched = patch_controller_source(source, &InstallOptions::default());
        assert!(patched
            .content
            .starts_with("//! Controllers.\n#![allow(dead_code)]\n\nuse easy_crud::EasyCrud;\npub struct Controller"));
        assert!(patched.content.contains("crud: easy_crud::Crud }\n\nimpl EasyCrud for Controller {"));
    }
}
