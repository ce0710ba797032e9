//! The members an aspect introduces into its governor, and their rendered form.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

use crate::constants::ASPECT_FILE_EXTENSION;
use crate::metadata::MetadataId;
use crate::model::{AnnotationMetadata, FieldMetadata, JavaType, MethodMetadata, Modifier};

/// Indentation of a member inside the aspect.
const MEMBER_INDENT: &str = "    ";

/// Indentation of a body statement inside a member.
const BODY_INDENT: &str = "        ";

/// Inter-type declarations produced for one governor.
///
/// Member order is the order in which the generator added them, which in turn follows
/// the declaration order of the source properties. Rendering and digests depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItdTypeDetails {
    pub(super) declared_by: MetadataId,
    pub(super) aspect: JavaType,
    pub(super) governor: JavaType,
    pub(super) type_annotations: Vec<AnnotationMetadata>,
    pub(super) fields: Vec<FieldMetadata>,
    pub(super) methods: Vec<MethodMetadata>,
}

impl ItdTypeDetails {
    /// The metadata identifier that produced these declarations.
    pub fn declared_by(&self) -> &MetadataId {
        &self.declared_by
    }

    /// The aspect type, e.g. `com.example.Customer_Roo_JavaBean`.
    pub fn aspect(&self) -> &JavaType {
        &self.aspect
    }

    pub fn governor(&self) -> &JavaType {
        &self.governor
    }

    pub fn type_annotations(&self) -> &[AnnotationMetadata] {
        &self.type_annotations
    }

    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodMetadata] {
        &self.methods
    }

    pub fn is_empty(&self) -> bool {
        self.type_annotations.is_empty() && self.fields.is_empty() && self.methods.is_empty()
    }

    /// Canonical file name for the rendered aspect.
    pub fn file_name(&self) -> String {
        format!("{}.{ASPECT_FILE_EXTENSION}", self.aspect.simple_name())
    }

    /// Render the aspect source text.
    ///
    /// The output is a pure function of the declarations, so an unchanged model always
    /// renders byte-identical text.
    pub fn render(&self) -> String {
        let governor = self.governor.simple_name();
        let mut out = String::new();

        let _ = writeln!(out, "// Generated by itdgen from {}", self.declared_by);
        let _ = writeln!(out, "// Do not edit: this file is rewritten whenever its governor changes.");
        out.push('\n');

        let package = self.governor.package();
        if !package.is_empty() {
            let _ = writeln!(out, "package {package};");
            out.push('\n');
        }

        let _ = writeln!(out, "privileged aspect {} {{", self.aspect.simple_name());

        for annotation in &self.type_annotations {
            out.push('\n');
            let _ = writeln!(out, "{MEMBER_INDENT}declare @type: {governor}: {annotation};");
        }

        for field in &self.fields {
            out.push('\n');
            render_annotations(&mut out, &field.annotations);
            let _ = write!(
                out,
                "{MEMBER_INDENT}{}{} {governor}.{}",
                modifier_prefix(field.modifier),
                field.field_type,
                field.name
            );
            if let Some(initializer) = &field.initializer {
                let _ = write!(out, " = {initializer}");
            }
            out.push_str(";\n");
        }

        for method in &self.methods {
            out.push('\n');
            render_annotations(&mut out, &method.annotations);
            let params: Vec<String> =
                method.parameters.iter().map(|p| format!("{} {}", p.param_type, p.name)).collect();
            let _ = writeln!(
                out,
                "{MEMBER_INDENT}{}{} {governor}.{}({}) {{",
                modifier_prefix(method.modifier),
                method.return_type,
                method.name,
                params.join(", ")
            );
            for line in method.body.as_deref().unwrap_or_default().lines() {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "{BODY_INDENT}{line}");
                }
            }
            let _ = writeln!(out, "{MEMBER_INDENT}}}");
        }

        out.push('\n');
        out.push_str("}\n");
        out
    }

    /// SHA-256 of the rendered text as `sha256:<hex>`.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.render().as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }
}

fn modifier_prefix(modifier: Modifier) -> String {
    let text = modifier.to_string();
    if text.is_empty() {
        text
    } else {
        format!("{text} ")
    }
}

fn render_annotations(out: &mut String, annotations: &[AnnotationMetadata]) {
    for annotation in annotations {
        let _ = writeln!(out, "{MEMBER_INDENT}{annotation}");
    }
}
