use proc_macro2::TokenStream;
use quote::quote;

use super::QueryResultAdapter;
use crate::row::RowAdapter;
use crate::CodeGenScope;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MapKind {
    Hash,
    BTree,
}

impl MapKind {
    fn new_map(self) -> TokenStream {
        match self {
            Self::Hash => quote! { ::std::collections::HashMap::new() },
            Self::BTree => quote! { ::std::collections::BTreeMap::new() },
        }
    }
}

///
/// One entry per distinct key. When several rows share a key,
/// the first row wins.
///
/// The value adapter is the row adapter of this shape; key adapters
/// never carry relations.
///
pub struct MapResultAdapter {
    kind: MapKind,
    key: Box<dyn RowAdapter>,
    value: Box<dyn RowAdapter>,
}

impl MapResultAdapter {
    pub fn new(kind: MapKind, key: Box<dyn RowAdapter>, value: Box<dyn RowAdapter>) -> Self {
        Self { kind, key, value }
    }
}

impl QueryResultAdapter for MapResultAdapter {
    fn row_adapter(&self) -> Option<&dyn RowAdapter> {
        Some(self.value.as_ref())
    }

    fn convert(&self, out: &syn::Ident, cursor: &syn::Ident, scope: &mut CodeGenScope) {
        let new_map = self.kind.new_map();
        let key_bindings = self.key.on_cursor_ready(cursor, scope);
        let value_bindings = self.value.on_cursor_ready(cursor, scope);

        let key = scope.tmp_var("key");
        let value = scope.tmp_var("value");
        let mut row_scope = scope.fork();
        self.key.convert(&key_bindings, &key, cursor, &mut row_scope);
        self.value
            .convert(&value_bindings, &value, cursor, &mut row_scope);
        let row = row_scope.into_tokens();

        scope.push(quote! {
            let mut #out = #new_map;
            while #cursor.move_to_next() {
                #row
                #out.entry(#key).or_insert(#value);
            }
        });
    }
}

///
/// Rows grouped per distinct key, in cursor order.
///
/// A row whose value columns are all NULL (e.g. the unmatched side of
/// a LEFT JOIN) registers its key with an empty group.
///
pub struct MultimapResultAdapter {
    kind: MapKind,
    key: Box<dyn RowAdapter>,
    value: Box<dyn RowAdapter>,
}

impl MultimapResultAdapter {
    pub fn new(kind: MapKind, key: Box<dyn RowAdapter>, value: Box<dyn RowAdapter>) -> Self {
        Self { kind, key, value }
    }
}

impl QueryResultAdapter for MultimapResultAdapter {
    fn row_adapter(&self) -> Option<&dyn RowAdapter> {
        Some(self.value.as_ref())
    }

    fn convert(&self, out: &syn::Ident, cursor: &syn::Ident, scope: &mut CodeGenScope) {
        let new_map = self.kind.new_map();
        let key_bindings = self.key.on_cursor_ready(cursor, scope);
        let value_bindings = self.value.on_cursor_ready(cursor, scope);

        let key = scope.tmp_var("key");
        let value = scope.tmp_var("value");

        let mut key_scope = scope.fork();
        self.key.convert(&key_bindings, &key, cursor, &mut key_scope);
        let key_row = key_scope.into_tokens();

        let mut value_scope = scope.fork();
        self.value
            .convert(&value_bindings, &value, cursor, &mut value_scope);
        let value_row = value_scope.into_tokens();

        let empty_group = self
            .value
            .null_check(&value_bindings, cursor)
            .map(|all_null| {
                quote! {
                    if #all_null {
                        #out.entry(#key).or_insert_with(::std::vec::Vec::new);
                        continue;
                    }
                }
            });

        scope.push(quote! {
            let mut #out = #new_map;
            while #cursor.move_to_next() {
                #key_row
                #empty_group
                #value_row
                #out.entry(#key).or_insert_with(::std::vec::Vec::new).push(#value);
            }
        });
    }
}
