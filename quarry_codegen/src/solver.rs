//!
//! Picks the result adapter and row adapter for a declared return type.
//!

use syn::spanned::Spanned;

use crate::relation::{Junction, Quantity, RelationCollector};
use crate::result::*;
use crate::row::{EntityField, EntityRowAdapter, RowAdapter, ScalarRowAdapter};
use crate::schema::{EntityDef, FieldDef, Schema};

/// Columns named by the `key` and `value` arguments of `#[query]`.
#[derive(Clone, Copy, Default)]
pub struct ResultColumns<'a> {
    pub key: Option<&'a str>,
    pub value: Option<&'a str>,
}

pub struct Solver<'s> {
    schema: &'s Schema,
}

impl<'s> Solver<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    ///
    /// Classify `ty` by its outermost type constructor:
    ///
    /// | type                          | shape          |
    /// |-------------------------------|----------------|
    /// | `Vec<T>`                      | list           |
    /// | `Option<T>`                   | optional       |
    /// | `HashMap<K, V>`, `BTreeMap`   | map            |
    /// | `HashMap<K, Vec<V>>`, ..      | multimap       |
    /// | `RowStream<T>`                | stream         |
    /// | `MemoryCursor`                | cursor         |
    /// | `RowCount`                    | row count      |
    /// | anything else                 | single         |
    ///
    pub fn result_adapter(
        &self,
        ty: &syn::Type,
        columns: ResultColumns,
    ) -> syn::Result<Box<dyn QueryResultAdapter>> {
        let (ident, args) = match generic_args(ty) {
            Some(split) => split,
            None => return Ok(Box::new(SingleResultAdapter::new(self.row_adapter(ty, columns.value)?))),
        };

        let adapter: Box<dyn QueryResultAdapter> = match (ident.to_string().as_str(), args.as_slice()) {
            // A blob column rather than a list of bytes.
            ("Vec", [elem]) if is_ident(elem, "u8") => {
                Box::new(SingleResultAdapter::new(self.row_adapter(ty, columns.value)?))
            }
            ("Vec", [elem]) => Box::new(ListResultAdapter::new(self.row_adapter(elem, columns.value)?)),
            ("Option", [elem]) => match self.schema.entity_for(elem) {
                Some(_) => Box::new(OptionalResultAdapter::new(
                    self.row_adapter(elem, columns.value)?,
                )),
                None => Box::new(OptionalResultAdapter::flattened(
                    self.row_adapter(ty, columns.value)?,
                )),
            },
            ("RowStream", [elem]) => {
                Box::new(StreamResultAdapter::new(self.row_adapter(elem, columns.value)?))
            }
            ("HashMap", [key, value]) => self.map_adapter(MapKind::Hash, key, value, columns)?,
            ("BTreeMap", [key, value]) => self.map_adapter(MapKind::BTree, key, value, columns)?,
            ("MemoryCursor", []) => Box::new(CursorResultAdapter),
            ("RowCount", []) => Box::new(RowCountResultAdapter),
            ("HashMap", _) | ("BTreeMap", _) | ("RowStream", _) | ("MemoryCursor", _)
            | ("RowCount", _) => {
                return Err(syn::Error::new(
                    ty.span(),
                    "Unexpected number of type arguments",
                ))
            }
            _ => Box::new(SingleResultAdapter::new(self.row_adapter(ty, columns.value)?)),
        };

        Ok(adapter)
    }

    fn map_adapter(
        &self,
        kind: MapKind,
        key: &syn::Type,
        value: &syn::Type,
        columns: ResultColumns,
    ) -> syn::Result<Box<dyn QueryResultAdapter>> {
        let key_adapter = self.row_adapter(key, columns.key)?;
        if key_adapter
            .relation_info()
            .map_or(false, |info| !info.collectors().is_empty())
        {
            return Err(syn::Error::new(
                key.span(),
                "A map key cannot have relation fields",
            ));
        }

        match generic_args(value) {
            Some((ident, args)) if ident == "Vec" && args.len() == 1 && !is_ident(args[0], "u8") => {
                Ok(Box::new(MultimapResultAdapter::new(
                    kind,
                    key_adapter,
                    self.row_adapter(args[0], columns.value)?,
                )))
            }
            _ => Ok(Box::new(MapResultAdapter::new(
                kind,
                key_adapter,
                self.row_adapter(value, columns.value)?,
            ))),
        }
    }

    /// A struct of the module maps onto an entity, anything else reads one column.
    pub fn row_adapter(
        &self,
        ty: &syn::Type,
        column: Option<&str>,
    ) -> syn::Result<Box<dyn RowAdapter>> {
        match self.schema.entity_for(ty) {
            Some(entity) => Ok(Box::new(self.entity_adapter(entity)?)),
            None => Ok(Box::new(ScalarRowAdapter::new(
                ty.clone(),
                column.map(str::to_string),
            ))),
        }
    }

    fn entity_adapter(&self, entity: &EntityDef) -> syn::Result<EntityRowAdapter> {
        let mut fields = vec![];
        let mut relations = vec![];

        for field in &entity.fields {
            match field {
                FieldDef::Column { ident, column, ty } => fields.push(EntityField {
                    ident: ident.clone(),
                    column: column.clone(),
                    ty: ty.clone(),
                }),
                FieldDef::Relation { .. } => relations.push(self.relation_collector(field)?),
            }
        }

        Ok(EntityRowAdapter::new(
            syn::Path::from(entity.ident.clone()),
            fields,
            relations,
        ))
    }

    fn relation_collector(&self, field: &FieldDef) -> syn::Result<RelationCollector> {
        let (ident, ty, attr) = match field {
            FieldDef::Relation { ident, ty, attr } => (ident, ty, attr),
            FieldDef::Column { ident, .. } => {
                return Err(syn::Error::new(ident.span(), "Expected a relation field"))
            }
        };

        let (quantity, elem) = match generic_args(ty) {
            Some((outer, args)) if outer == "Vec" && args.len() == 1 => (Quantity::Many, args[0]),
            Some((outer, args)) if outer == "Option" && args.len() == 1 => {
                (Quantity::Optional, args[0])
            }
            _ => {
                return Err(syn::Error::new(
                    ty.span(),
                    "Expected Vec<T> or Option<T> for a relation field",
                ))
            }
        };

        let related = self.schema.entity_for(elem).ok_or_else(|| {
            syn::Error::new(elem.span(), "Expected a struct declared in this module")
        })?;

        let table = related.table.as_ref().ok_or_else(|| {
            syn::Error::new(
                elem.span(),
                "The related struct needs a #[table(\"name\")] attribute",
            )
        })?;

        if related.has_relations() {
            return Err(syn::Error::new(
                attr.span,
                "Nested relations are not supported",
            ));
        }

        Ok(RelationCollector {
            field: ident.clone(),
            parent_column: attr.parent_column.value(),
            entity_table: table.value(),
            entity_column: attr.entity_column.value(),
            junction: attr.junction.as_ref().map(|junction| Junction {
                table: junction.table.value(),
                parent_column: junction.parent_column.value(),
                entity_column: junction.entity_column.value(),
            }),
            quantity,
            entity: self.entity_adapter(related)?,
        })
    }
}

/// The last path segment of `ty` and its type arguments.
fn generic_args(ty: &syn::Type) -> Option<(&syn::Ident, Vec<&syn::Type>)> {
    let path = match ty {
        syn::Type::Path(path) if path.qself.is_none() => path,
        _ => return None,
    };
    let segment = path.path.segments.last()?;

    let args = match &segment.arguments {
        syn::PathArguments::None => vec![],
        syn::PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        syn::PathArguments::Parenthesized(_) => return None,
    };

    Some((&segment.ident, args))
}

fn is_ident(ty: &syn::Type, name: &str) -> bool {
    match ty {
        syn::Type::Path(path) => path.qself.is_none() && path.path.is_ident(name),
        _ => false,
    }
}
