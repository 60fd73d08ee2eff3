//!
//! Relation collectors.
//!
//! A relation collector hydrates one relation field of an entity. Before any
//! row is converted, it collects the parent keys of all rows, rewinds the
//! cursor, fetches the related rows in a secondary query and groups them by
//! parent key. Row conversion then only looks up the group of each row.
//!

use proc_macro2::TokenStream;
use quote::quote;

use crate::row::{EntityRowAdapter, RelationBinding, RowAdapter};
use crate::CodeGenScope;

/// How many related elements a relation field holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quantity {
    /// `Vec<T>`: the whole group, possibly empty.
    Many,
    /// `Option<T>`: the first element of the group.
    Optional,
}

pub struct Junction {
    pub table: String,
    pub parent_column: String,
    pub entity_column: String,
}

pub struct RelationCollector {
    /// The relation field of the parent struct.
    pub field: syn::Ident,
    /// Parent key column, read from the parent cursor.
    pub parent_column: String,
    pub entity_table: String,
    /// Column of `entity_table` matched against the parent key.
    pub entity_column: String,
    pub junction: Option<Junction>,
    pub quantity: Quantity,
    /// Adapter for rows of `entity_table`. Never has relations of its own.
    pub entity: EntityRowAdapter,
}

impl RelationCollector {
    pub fn field(&self) -> &syn::Ident {
        &self.field
    }

    /// Tables read by the secondary query.
    pub fn table_names(&self) -> Vec<String> {
        let mut tables = vec![self.entity_table.clone()];
        if let Some(junction) = &self.junction {
            tables.push(junction.table.clone());
        }
        tables
    }

    fn relation_query(&self, scope: &CodeGenScope) -> TokenStream {
        let rt = scope.runtime();
        let table = &self.entity_table;
        let entity_column = &self.entity_column;

        let junction = match &self.junction {
            Some(junction) => {
                let junction_table = &junction.table;
                let parent_column = &junction.parent_column;
                let link_column = &junction.entity_column;
                quote! {
                    ::std::option::Option::Some(#rt::relation::Junction {
                        table: #junction_table,
                        parent_column: #parent_column,
                        entity_column: #link_column,
                    })
                }
            }
            None => quote! { ::std::option::Option::None },
        };

        quote! {
            #rt::relation::RelationQuery {
                table: #table,
                entity_column: #entity_column,
                junction: #junction,
            }
        }
    }

    /// Emit key collection and the secondary fetch on a copied `cursor`.
    pub(crate) fn prepare(&self, cursor: &syn::Ident, scope: &mut CodeGenScope) -> RelationBinding {
        let rt = scope.runtime().clone();
        let db = scope.db().clone();
        let parent_column = &self.parent_column;
        let entity_ty = self.entity.out_type();
        let relation_query = self.relation_query(scope);

        let key_index = scope.tmp_var("key_index");
        let keys = scope.tmp_var("keys");
        let groups = scope.tmp_var("groups");
        let related = scope.tmp_var("related");
        let related_key_index = scope.tmp_var("key_index");
        let related_key = scope.tmp_var("key");
        let item = scope.tmp_var("item");

        let mut related_scope = scope.fork();
        let related_bindings = self.entity.on_cursor_ready(&related, &mut related_scope);
        let related_ready = related_scope.into_tokens();

        let mut row_scope = scope.fork();
        self.entity
            .convert(&related_bindings, &item, &related, &mut row_scope);
        let related_row = row_scope.into_tokens();

        scope.push(quote! {
            let #key_index = #cursor.column_index_or_err(#parent_column)?;
            let mut #keys = ::std::collections::BTreeSet::<#rt::RelationKey>::new();
            while #cursor.move_to_next() {
                if let ::std::option::Option::Some(key) = #cursor.value(#key_index)?.to_key() {
                    #keys.insert(key);
                }
            }
            #cursor.reset();

            let mut #groups = ::std::collections::BTreeMap::<
                #rt::RelationKey,
                ::std::vec::Vec<#entity_ty>
            >::new();
            {
                let mut #related = #rt::relation::fetch(#db, &#relation_query, #keys).await?;
                if !#related.is_empty() {
                    let #related_key_index = #related.column_index_or_err(#rt::relation::KEY_COLUMN)?;
                    #related_ready
                    while #related.move_to_next() {
                        let #related_key = #related.value(#related_key_index)?.to_key();
                        #related_row
                        if let ::std::option::Option::Some(key) = #related_key {
                            #groups.entry(key).or_default().push(#item);
                        }
                    }
                }
            }
        });

        RelationBinding { key_index, groups }
    }

    /// The value of the relation field for the current row of `cursor`.
    pub(crate) fn attach(&self, binding: &RelationBinding, cursor: &syn::Ident) -> TokenStream {
        let key_index = &binding.key_index;
        let groups = &binding.groups;

        let group = quote! {
            #cursor
                .value(#key_index)?
                .to_key()
                .and_then(|key| #groups.get(&key))
        };

        match self.quantity {
            Quantity::Many => quote! {
                #group.cloned().unwrap_or_default()
            },
            Quantity::Optional => quote! {
                #group.and_then(|items| items.first()).cloned()
            },
        }
    }
}
