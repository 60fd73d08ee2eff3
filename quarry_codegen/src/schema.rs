//!
//! Mapping structs declared inside a `#[quarry::database]` module.
//!

use std::collections::BTreeMap;
use syn::spanned::Spanned;

use crate::attr::attr_util;
use crate::attr::relation::RelationAttr;

pub struct EntityDef {
    pub ident: syn::Ident,
    /// From `#[table("name")]`. Only structs with a table can be the
    /// target of a relation.
    pub table: Option<syn::LitStr>,
    pub fields: Vec<FieldDef>,
}

pub enum FieldDef {
    Column {
        ident: syn::Ident,
        column: String,
        ty: syn::Type,
    },
    Relation {
        ident: syn::Ident,
        ty: syn::Type,
        attr: RelationAttr,
    },
}

impl EntityDef {
    ///
    /// Read the mapping attributes of `item`, removing them so the struct
    /// can be emitted as plain Rust.
    ///
    /// Returns `Ok(None)` for structs without named fields, which are not
    /// mapping structs.
    ///
    pub fn from_struct(item: &mut syn::ItemStruct) -> syn::Result<Option<Self>> {
        let table = attr_util::take_attr(&mut item.attrs, "table")
            .map(|attr| attr.parse_args::<syn::LitStr>())
            .transpose()?;

        let named = match &mut item.fields {
            syn::Fields::Named(named) => named,
            _ => {
                return match table {
                    Some(table) => Err(syn::Error::new(
                        table.span(),
                        "A table struct must have named fields",
                    )),
                    None => Ok(None),
                }
            }
        };

        let mut fields = vec![];
        for field in named.named.iter_mut() {
            fields.push(FieldDef::from_field(field)?);
        }

        Ok(Some(Self {
            ident: item.ident.clone(),
            table,
            fields,
        }))
    }

    pub fn has_relations(&self) -> bool {
        self.fields
            .iter()
            .any(|field| matches!(field, FieldDef::Relation { .. }))
    }
}

impl FieldDef {
    fn from_field(field: &mut syn::Field) -> syn::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "Expected a named field"))?;

        let column = attr_util::take_attr(&mut field.attrs, "column")
            .map(|attr| attr.parse_args::<syn::LitStr>())
            .transpose()?;
        let relation = attr_util::take_attr(&mut field.attrs, "relation")
            .map(|attr| attr.parse_args::<RelationAttr>())
            .transpose()?;

        match (column, relation) {
            (Some(column), Some(_)) => Err(syn::Error::new(
                column.span(),
                "A relation field is not read from a column",
            )),
            (column, None) => Ok(Self::Column {
                column: column
                    .map(|column| column.value())
                    .unwrap_or_else(|| ident.to_string()),
                ident,
                ty: field.ty.clone(),
            }),
            (None, Some(attr)) => Ok(Self::Relation {
                ident,
                ty: field.ty.clone(),
                attr,
            }),
        }
    }
}

/// All mapping structs of one module, by struct name.
#[derive(Default)]
pub struct Schema {
    entities: BTreeMap<String, EntityDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: EntityDef) {
        self.entities.insert(entity.ident.to_string(), entity);
    }

    pub fn get(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// The mapping struct named by `ty`, if `ty` is a plain single-segment path.
    pub fn entity_for(&self, ty: &syn::Type) -> Option<&EntityDef> {
        match ty {
            syn::Type::Path(path) if path.qself.is_none() => {
                let ident = path.path.get_ident()?;
                self.get(&ident.to_string())
            }
            _ => None,
        }
    }
}
