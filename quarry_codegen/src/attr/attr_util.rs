pub fn attr_has_simple_ident(attr: &syn::Attribute, name: &str) -> bool {
    attr.path.leading_colon.is_none() && attr.path.is_ident(name)
}

/// Remove the first attribute named `name` from `attrs`.
pub fn take_attr(attrs: &mut Vec<syn::Attribute>, name: &str) -> Option<syn::Attribute> {
    let position = attrs
        .iter()
        .position(|attr| attr_has_simple_ident(attr, name))?;

    Some(attrs.remove(position))
}

/// Parse a `name = "value"` list, handing every key to `on_key`.
///
/// `on_key` consumes whatever follows the key.
pub fn parse_key_values(
    input: syn::parse::ParseStream,
    mut on_key: impl FnMut(&syn::Ident, syn::parse::ParseStream) -> syn::Result<()>,
) -> syn::Result<()> {
    while !input.is_empty() {
        let key: syn::Ident = input.parse()?;
        on_key(&key, input)?;

        if !input.is_empty() {
            let _: syn::token::Comma = input.parse()?;
        }
    }

    Ok(())
}

pub fn parse_eq_str(input: syn::parse::ParseStream) -> syn::Result<syn::LitStr> {
    let _: syn::token::Eq = input.parse()?;
    input.parse()
}
