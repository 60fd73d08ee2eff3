//!
//! Query declarations and the functions generated for them.
//!
//! ```text
//! #[query("SELECT * FROM author WHERE id = $1")]
//! fn author_by_id(id: i64) -> Option<Author>;
//! ```
//!
//! becomes an `async fn author_by_id<C>(db: &C, id: i64)` returning
//! `QuarryResult<Option<Author>>`, plus an `AUTHOR_BY_ID_QUERY` constant.
//!

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::spanned::Spanned;

use crate::attr::attr_util;
use crate::attr::query::QueryAttr;
use crate::result::QueryResultAdapter;
use crate::solver::{ResultColumns, Solver};
use crate::{CodeGenScope, Options};

/// Name of the connection parameter of every generated function.
const DB_ARG: &str = "db";

pub struct QueryMethod {
    pub span: Span,
    /// Attributes passed through to the generated function, e.g. docs.
    pub attrs: Vec<syn::Attribute>,
    pub vis: syn::Visibility,
    pub ident: syn::Ident,
    pub query: QueryAttr,
    pub args: Vec<(syn::Ident, syn::Type)>,
    pub output: syn::Type,
}

impl QueryMethod {
    pub fn from_method(vis: syn::Visibility, mut method: syn::TraitItemMethod) -> syn::Result<Self> {
        let span = method.span();

        let query = attr_util::take_attr(&mut method.attrs, "query")
            .ok_or_else(|| syn::Error::new(span, "Expected a #[query(\"..\")] attribute"))?
            .parse_args::<QueryAttr>()?;

        if let Some(block) = &method.default {
            return Err(syn::Error::new(
                block.span(),
                "A query declaration has no body",
            ));
        }
        if !method.sig.generics.params.is_empty() {
            return Err(syn::Error::new(
                method.sig.generics.span(),
                "A query declaration cannot be generic",
            ));
        }

        let mut args = vec![];
        for input in &method.sig.inputs {
            args.push(Self::arg(input)?);
        }

        let output = match method.sig.output {
            syn::ReturnType::Default => {
                return Err(syn::Error::new(span, "Expected return type"))
            }
            syn::ReturnType::Type(_, ty) => *ty,
        };

        Ok(Self {
            span,
            attrs: method.attrs,
            vis,
            ident: method.sig.ident,
            query,
            args,
            output,
        })
    }

    fn arg(input: &syn::FnArg) -> syn::Result<(syn::Ident, syn::Type)> {
        let typed = match input {
            syn::FnArg::Typed(typed) => typed,
            syn::FnArg::Receiver(receiver) => {
                return Err(syn::Error::new(
                    receiver.span(),
                    "A query declaration takes no receiver",
                ))
            }
        };

        let ident = match typed.pat.as_ref() {
            syn::Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => {
                pat.ident.clone()
            }
            pat => return Err(syn::Error::new(pat.span(), "Expected an argument name")),
        };

        if ident == DB_ARG {
            return Err(syn::Error::new(
                ident.span(),
                "`db` is reserved for the connection argument",
            ));
        }

        Ok((ident, typed.ty.as_ref().clone()))
    }
}

pub fn gen_query_fn(method: &QueryMethod, solver: &Solver, options: &Options) -> TokenStream {
    let key = method.query.key_column.as_ref().map(syn::LitStr::value);
    let value = method.query.value_column.as_ref().map(syn::LitStr::value);
    let columns = ResultColumns {
        key: key.as_deref(),
        value: value.as_deref(),
    };

    match solver.result_adapter(&method.output, columns) {
        Ok(adapter) => gen_query_fn_with(method, adapter.as_ref(), options),
        Err(error) => error.to_compile_error(),
    }
}

fn gen_query_fn_with(
    method: &QueryMethod,
    adapter: &dyn QueryResultAdapter,
    options: &Options,
) -> TokenStream {
    let rt = &options.runtime;
    let db = syn::Ident::new(DB_ARG, Span::call_site());
    let mut scope = CodeGenScope::new(rt.clone(), db.clone());

    let sql = &method.query.sql;
    let arg_idents: Vec<_> = method.args.iter().map(|(ident, _)| ident).collect();
    let arg_types = method.args.iter().map(|(_, ty)| ty);

    let cursor = scope.tmp_var("cursor");
    scope.push(quote! {
        let mut #cursor = #db.query(#sql, &[#(#rt::Value::from(#arg_idents)),*]).await?;
    });

    let copies_cursor = adapter.should_copy_cursor();
    let cursor = if copies_cursor {
        let copy = scope.tmp_var("cursor");
        scope.push(quote! {
            let mut #copy = #rt::copy_cursor(&mut #cursor)?;
        });
        copy
    } else {
        cursor
    };

    let out = scope.tmp_var("out");
    adapter.convert(&out, &cursor, &mut scope);
    let body = scope.into_tokens();

    let attrs = &method.attrs;
    let vis = &method.vis;
    let ident = &method.ident;
    let output = &method.output;

    let name = ident.to_string();
    let info_ident = format_ident!("{}_QUERY", name.to_uppercase());
    let relation_tables = adapter.accessed_table_names().into_iter();

    quote! {
        #vis const #info_ident: #rt::QueryInfo = #rt::QueryInfo {
            name: #name,
            sql: #sql,
            relation_tables: &[#(#relation_tables),*],
            copies_cursor: #copies_cursor,
        };

        #(#attrs)*
        #vis async fn #ident<C>(#db: &C, #(#arg_idents: #arg_types),*) -> #rt::QuarryResult<#output>
        where
            C: #rt::Connection + ?Sized,
        {
            #[allow(unused_imports)]
            use #rt::{Cursor as _, CursorExt as _};

            #body
            ::std::result::Result::Ok(#out)
        }
    }
}
