//! Attribute schema to type expression mapping.
//!
//! | kind                    | type expression            |
//! |-------------------------|----------------------------|
//! | bool / int / float      | `bool` / `i64` / `f64`     |
//! | string                  | `String`                   |
//! | map (any value type)    | `HashMap<String, String>`  |
//! | list/set of attribute   | `Vec<T>`                   |
//! | list/set of resource    | `Vec<Parent_attr_N>`       |
//!
//! Map values are always strings: the bridge runtime flattens map values to
//! strings when marshaling, so the declared value type is not consulted.

use crate::error::GenerateError;
use crate::generation::Generation;
use crate::schema::{Attribute, AttributeKind, Elem};
use crate::types::TypeExpr;

impl Generation {
    /// Map `attr` to a type expression, emitting nested aggregates for
    /// resource elements.
    ///
    /// `parent` is the aggregate the attribute belongs to and `name` the
    /// attribute's name; together they seed minted nested names.
    pub(crate) fn map_type(
        &mut self,
        parent: &str,
        name: &str,
        attr: &Attribute,
    ) -> Result<TypeExpr, GenerateError> {
        let ty = match attr.kind {
            AttributeKind::Bool => TypeExpr::Bool,
            AttributeKind::Int => TypeExpr::Int,
            AttributeKind::Float => TypeExpr::Float,
            AttributeKind::String => TypeExpr::String,
            AttributeKind::Map => TypeExpr::StringMap,
            AttributeKind::List | AttributeKind::Set => match &attr.elem {
                Some(Elem::Resource(resource)) => {
                    let nested = self.mint(parent, name);
                    self.emit_aggregate(&nested, resource, false)?;
                    TypeExpr::sequence(TypeExpr::Named(nested))
                },
                Some(Elem::Attribute(elem)) => {
                    TypeExpr::sequence(self.map_type(parent, name, elem)?)
                },
                None => {
                    return Err(GenerateError::unsupported(
                        format!("{}.{}", parent, name),
                        format!("Unsupported {:?}: element {:?}", attr.kind, attr.elem),
                    ));
                },
            },
            AttributeKind::Invalid => {
                return Err(GenerateError::unsupported(
                    format!("{}.{}", parent, name),
                    format!("Unknown schema type: {:?}", attr.kind),
                ));
            },
        };
        Ok(ty)
    }

    /// Map `attr` like [`Generation::map_type`], wrapping the result in
    /// `Option` unless the attribute is required.
    ///
    /// Sequence elements inherit optionality from the outer attribute only.
    pub(crate) fn field_type(
        &mut self,
        parent: &str,
        name: &str,
        attr: &Attribute,
    ) -> Result<TypeExpr, GenerateError> {
        let ty = self.map_type(parent, name, attr)?;
        if attr.required {
            Ok(ty)
        } else {
            Ok(TypeExpr::optional(ty))
        }
    }
}
