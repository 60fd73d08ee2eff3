use syn::parse::ParseStream;

use crate::attr::attr_util;

///
/// `#[query("SELECT ..", key = "column", value = "column")]`
///
/// `key` and `value` name the columns read by scalar map keys and values.
///
pub struct QueryAttr {
    pub sql: syn::LitStr,
    pub key_column: Option<syn::LitStr>,
    pub value_column: Option<syn::LitStr>,
}

impl syn::parse::Parse for QueryAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let sql: syn::LitStr = input.parse()?;
        let mut key_column = None;
        let mut value_column = None;

        if !input.is_empty() {
            let _: syn::token::Comma = input.parse()?;
        }

        attr_util::parse_key_values(input, |key, input| {
            if key == "key" {
                key_column = Some(attr_util::parse_eq_str(input)?);
            } else if key == "value" {
                value_column = Some(attr_util::parse_eq_str(input)?);
            } else {
                return Err(syn::Error::new(key.span(), "Expected `key` or `value`"));
            }
            Ok(())
        })?;

        if sql.value().trim().is_empty() {
            return Err(syn::Error::new(sql.span(), "Query must not be empty"));
        }

        Ok(Self {
            sql,
            key_column,
            value_column,
        })
    }
}
