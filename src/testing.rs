//! Testing utilities for generated bridge packages.
//!
//! [`GeneratedFile`] parses emitted source with `syn` so tests can assert on
//! its structure (aggregates, fields, registrations) instead of matching raw
//! text. The assertion helpers check validation diagnostics.
//!
//! # Example
//!
//! ```
//! use hemmer_bridge_gen::render;
//! use hemmer_bridge_gen::schema::{Attribute, Provider, Resource};
//! use hemmer_bridge_gen::testing::GeneratedFile;
//!
//! let provider = Provider::new().with_resource(
//!     "widget",
//!     Resource::new().with_attribute("size", Attribute::optional_int().with_force_new()),
//! );
//! let file = GeneratedFile::parse(&render(&provider, "Example").unwrap()).unwrap();
//!
//! assert_eq!(file.aggregates(), vec!["Widget"]);
//! assert_eq!(file.provided_attributes("Widget"), vec!["widget_id", "size"]);
//! assert_eq!(file.immutable_attributes("Widget"), vec!["size"]);
//! ```

use syn::punctuated::Punctuated;
use syn::{
    Expr, ExprMethodCall, Fields, GenericArgument, Item, ItemFn, ItemStruct, Lit, LitStr,
    PathArguments, Stmt, Token, Type,
};

use crate::schema::{Diagnostic, DiagnosticSeverity};
use crate::types::identity_field;

/// A parsed generated package.
pub struct GeneratedFile {
    source: String,
    file: syn::File,
}

impl GeneratedFile {
    /// Parse generated source.
    pub fn parse(source: &str) -> Result<Self, syn::Error> {
        Ok(Self {
            source: source.to_string(),
            file: syn::parse_file(source)?,
        })
    }

    /// The source text this file was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of the generated aggregates (structs deriving `Serialize`),
    /// in file order.
    pub fn aggregates(&self) -> Vec<String> {
        self.structs()
            .filter(|s| derives(s, "Serialize"))
            .map(|s| s.ident.to_string())
            .collect()
    }

    /// Whether the aggregate `name` carries the hidden identity field.
    pub fn has_identity_field(&self, name: &str) -> bool {
        let identity = identity_field(name);
        self.aggregate(name).is_some_and(|s| {
            named_fields(s).any(|field| {
                field.ident.as_ref().is_some_and(|ident| *ident == identity)
                    && serde_options(&field.attrs).skip
            })
        })
    }

    /// `(field, type)` pairs of the aggregate `name`, in declaration order.
    /// Types are rendered as `Option<Vec<T>>`, `HashMap<String, String>`.
    pub fn fields(&self, name: &str) -> Vec<(String, String)> {
        self.aggregate(name)
            .map(|s| {
                named_fields(s)
                    .filter_map(|field| {
                        let ident = field.ident.as_ref()?;
                        Some((ident.to_string(), type_to_string(&field.ty)))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Serialized attribute names of the aggregate `name`, skipping fields
    /// excluded from serialization.
    pub fn serde_names(&self, name: &str) -> Vec<String> {
        self.aggregate(name)
            .map(|s| {
                named_fields(s)
                    .filter_map(|field| {
                        let options = serde_options(&field.attrs);
                        if options.skip {
                            None
                        } else {
                            options.rename
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attributes passed to `provided_attributes` in `<name>_rtb`.
    pub fn provided_attributes(&self, name: &str) -> Vec<String> {
        self.builder_call(name, "provided_attributes")
    }

    /// Attributes passed to `immutable_attributes` in `<name>_rtb`.
    pub fn immutable_attributes(&self, name: &str) -> Vec<String> {
        self.builder_call(name, "immutable_attributes")
    }

    /// Aggregates registered by `Initialize`, in registration order.
    pub fn registrations(&self) -> Vec<String> {
        let Some(initialize) = self.function("Initialize") else {
            return Vec::new();
        };

        initialize
            .block
            .stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Local(local) => local.init.as_ref().map(|init| init.expr.as_ref()),
                _ => None,
            })
            .filter_map(|expr| match expr {
                Expr::MethodCall(call) if call.method == "build_resource" => {
                    call.turbofish.as_ref()
                },
                _ => None,
            })
            .filter_map(|turbofish| match turbofish.args.first() {
                Some(GenericArgument::Type(ty)) => Some(type_to_string(ty)),
                _ => None,
            })
            .collect()
    }

    fn structs(&self) -> impl Iterator<Item = &ItemStruct> {
        self.file.items.iter().filter_map(|item| match item {
            Item::Struct(s) => Some(s),
            _ => None,
        })
    }

    fn aggregate(&self, name: &str) -> Option<&ItemStruct> {
        self.structs().find(|s| s.ident == name && derives(s, "Serialize"))
    }

    fn function(&self, name: &str) -> Option<&ItemFn> {
        self.file.items.iter().find_map(|item| match item {
            Item::Fn(f) if f.sig.ident == name => Some(f),
            _ => None,
        })
    }

    fn builder_call(&self, name: &str, method: &str) -> Vec<String> {
        let Some(builder) = self.function(&format!("{}_rtb", name)) else {
            return Vec::new();
        };

        builder
            .block
            .stmts
            .iter()
            .find_map(|stmt| match stmt {
                Stmt::Expr(Expr::MethodCall(call), _) if call.method == method => {
                    Some(string_array_arg(call))
                },
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[derive(Default)]
struct SerdeOptions {
    skip: bool,
    rename: Option<String>,
}

fn serde_options(attrs: &[syn::Attribute]) -> SerdeOptions {
    let mut options = SerdeOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
            }
            Ok(())
        });
    }
    options
}

fn derives(item: &ItemStruct, name: &str) -> bool {
    item.attrs
        .iter()
        .filter(|a| a.path().is_ident("derive"))
        .filter_map(|a| {
            a.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .any(|path| path.segments.last().is_some_and(|seg| seg.ident == name))
}

fn named_fields(item: &ItemStruct) -> impl Iterator<Item = &syn::Field> {
    let fields = match &item.fields {
        Fields::Named(named) => Some(named.named.iter()),
        _ => None,
    };
    fields.into_iter().flatten()
}

/// `f(&["a", "b"])` → `["a", "b"]`
fn string_array_arg(call: &ExprMethodCall) -> Vec<String> {
    let Some(Expr::Reference(reference)) = call.args.first() else {
        return Vec::new();
    };
    let Expr::Array(array) = reference.expr.as_ref() else {
        return Vec::new();
    };
    array
        .elems
        .iter()
        .filter_map(|elem| match elem {
            Expr::Lit(lit) => match &lit.lit {
                Lit::Str(s) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn type_to_string(ty: &Type) -> String {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .iter()
            .map(|segment| {
                let mut out = segment.ident.to_string();
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    let inner: Vec<String> = args
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            GenericArgument::Type(ty) => Some(type_to_string(ty)),
                            _ => None,
                        })
                        .collect();
                    out.push('<');
                    out.push_str(&inner.join(", "));
                    out.push('>');
                }
                out
            })
            .collect::<Vec<_>>()
            .join("::"),
        other => other_type_to_string(other),
    }
}

fn other_type_to_string(ty: &Type) -> String {
    match ty {
        Type::Reference(reference) => format!("&{}", type_to_string(&reference.elem)),
        Type::Slice(slice) => format!("[{}]", type_to_string(&slice.elem)),
        Type::Tuple(tuple) if tuple.elems.is_empty() => "()".to_string(),
        _ => "_".to_string(),
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    let has_errors = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error));

    assert!(has_errors, "Expected at least one error, but got none");
}

/// Assert that some error diagnostic's summary or detail contains `text`.
///
/// # Panics
///
/// Panics if no error mentions `text`.
pub fn assert_error_contains(diagnostics: &[Diagnostic], text: &str) {
    let found = diagnostics.iter().filter(|d| d.is_error()).any(|d| {
        d.summary.contains(text) || d.detail.as_deref().is_some_and(|detail| detail.contains(text))
    });

    assert!(
        found,
        "Expected an error containing '{}', got: {:?}",
        text,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}
