use quote::quote;

use super::QueryResultAdapter;
use crate::row::RowAdapter;
use crate::CodeGenScope;

/// Every row, in cursor order, collected into a `Vec`.
pub struct ListResultAdapter {
    row: Box<dyn RowAdapter>,
}

impl ListResultAdapter {
    pub fn new(row: Box<dyn RowAdapter>) -> Self {
        Self { row }
    }
}

impl QueryResultAdapter for ListResultAdapter {
    fn row_adapter(&self) -> Option<&dyn RowAdapter> {
        Some(self.row.as_ref())
    }

    fn convert(&self, out: &syn::Ident, cursor: &syn::Ident, scope: &mut CodeGenScope) {
        let bindings = self.row.on_cursor_ready(cursor, scope);
        let item = scope.tmp_var("item");
        let mut row_scope = scope.fork();
        self.row.convert(&bindings, &item, cursor, &mut row_scope);
        let row = row_scope.into_tokens();

        scope.push(quote! {
            let mut #out = ::std::vec::Vec::new();
            while #cursor.move_to_next() {
                #row
                #out.push(#item);
            }
        });
    }
}

/// Every row, in cursor order, delivered as a `RowStream`.
pub struct StreamResultAdapter {
    list: ListResultAdapter,
}

impl StreamResultAdapter {
    pub fn new(row: Box<dyn RowAdapter>) -> Self {
        Self {
            list: ListResultAdapter::new(row),
        }
    }
}

impl QueryResultAdapter for StreamResultAdapter {
    fn row_adapter(&self) -> Option<&dyn RowAdapter> {
        self.list.row_adapter()
    }

    fn convert(&self, out: &syn::Ident, cursor: &syn::Ident, scope: &mut CodeGenScope) {
        let rt = scope.runtime().clone();
        let items = scope.tmp_var("items");
        self.list.convert(&items, cursor, scope);

        scope.push(quote! {
            let #out = #rt::stream::from_vec(#items);
        });
    }
}
