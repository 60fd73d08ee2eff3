use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::cell::Cell;
use std::rc::Rc;

///
/// Append-only sink for emitted statements.
///
/// Forks share the temporary variable counter with their parent,
/// so variables declared in nested blocks never shadow each other.
///
pub struct CodeGenScope {
    runtime: syn::Path,
    db: syn::Ident,
    tmp_index: Rc<Cell<usize>>,
    stmts: Vec<TokenStream>,
}

impl CodeGenScope {
    pub fn new(runtime: syn::Path, db: syn::Ident) -> Self {
        Self {
            runtime,
            db,
            tmp_index: Rc::new(Cell::new(0)),
            stmts: vec![],
        }
    }

    /// Path to the runtime crate in emitted code.
    pub fn runtime(&self) -> &syn::Path {
        &self.runtime
    }

    /// The connection variable in emitted code.
    pub fn db(&self) -> &syn::Ident {
        &self.db
    }

    pub fn tmp_var(&self, prefix: &str) -> syn::Ident {
        let index = self.tmp_index.get();
        self.tmp_index.set(index + 1);
        format_ident!("__{}{}", prefix, index)
    }

    pub fn push(&mut self, tokens: TokenStream) {
        self.stmts.push(tokens);
    }

    /// A new, empty scope for a nested block.
    pub fn fork(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            db: self.db.clone(),
            tmp_index: self.tmp_index.clone(),
            stmts: vec![],
        }
    }

    pub fn into_tokens(self) -> TokenStream {
        let stmts = self.stmts;
        quote! { #(#stmts)* }
    }
}
