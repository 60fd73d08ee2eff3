use quote::quote;

use super::{type_name, QueryResultAdapter};
use crate::row::RowAdapter;
use crate::CodeGenScope;

/// A non-nullable single result: the first row, or a runtime error
/// when there is none.
pub struct SingleResultAdapter {
    row: Box<dyn RowAdapter>,
}

impl SingleResultAdapter {
    pub fn new(row: Box<dyn RowAdapter>) -> Self {
        Self { row }
    }
}

impl QueryResultAdapter for SingleResultAdapter {
    fn row_adapter(&self) -> Option<&dyn RowAdapter> {
        Some(self.row.as_ref())
    }

    fn convert(&self, out: &syn::Ident, cursor: &syn::Ident, scope: &mut CodeGenScope) {
        let rt = scope.runtime().clone();
        let expected = type_name(self.row.as_ref());

        let bindings = self.row.on_cursor_ready(cursor, scope);
        let item = scope.tmp_var("item");
        let mut row_scope = scope.fork();
        self.row.convert(&bindings, &item, cursor, &mut row_scope);
        let row = row_scope.into_tokens();

        scope.push(quote! {
            let #out = if #cursor.move_to_next() {
                #row
                #item
            } else {
                return ::std::result::Result::Err(#rt::QuarryError::EmptyResult {
                    expected: #expected,
                });
            };
        });
    }
}

/// A nullable single result: the first row, if any.
pub struct OptionalResultAdapter {
    row: Box<dyn RowAdapter>,
    flatten: bool,
}

impl OptionalResultAdapter {
    pub fn new(row: Box<dyn RowAdapter>) -> Self {
        Self {
            row,
            flatten: false,
        }
    }

    /// For a row adapter that already produces an `Option`, e.g. a nullable
    /// column. An empty cursor and a NULL first row both give `None`.
    pub fn flattened(row: Box<dyn RowAdapter>) -> Self {
        Self { row, flatten: true }
    }
}

impl QueryResultAdapter for OptionalResultAdapter {
    fn row_adapter(&self) -> Option<&dyn RowAdapter> {
        Some(self.row.as_ref())
    }

    fn convert(&self, out: &syn::Ident, cursor: &syn::Ident, scope: &mut CodeGenScope) {
        let bindings = self.row.on_cursor_ready(cursor, scope);
        let item = scope.tmp_var("item");
        let mut row_scope = scope.fork();
        self.row.convert(&bindings, &item, cursor, &mut row_scope);
        let row = row_scope.into_tokens();

        let some = if self.flatten {
            quote! { #item }
        } else {
            quote! { ::std::option::Option::Some(#item) }
        };

        scope.push(quote! {
            let #out = if #cursor.move_to_next() {
                #row
                #some
            } else {
                ::std::option::Option::None
            };
        });
    }
}
