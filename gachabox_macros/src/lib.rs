use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

/// Derives `gachabox::Category` plus `PartialOrd`/`Ord` for a fieldless enum.
///
/// Rank is declaration order: the first variant is the lowest (base) tier.
/// Variant attribute: `#[label("...")]` overrides the display name.
#[proc_macro_derive(Category, attributes(label))]
pub fn derive_category(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let enum_ident = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new(input.ident.span(), "Category can only be derived for enums")
            .to_compile_error()
            .into();
    };

    if data_enum.variants.is_empty() {
        return syn::Error::new(input.ident.span(), "Category needs at least one variant")
            .to_compile_error()
            .into();
    }

    let mut idents = Vec::new();
    let mut labels = Vec::new();

    for variant in &data_enum.variants {
        // Categories are plain tags; payloads would make the order ambiguous
        match &variant.fields {
            Fields::Unit => {}
            _ => {
                return syn::Error::new(variant.span(), "Category only supports fieldless variants")
                    .to_compile_error()
                    .into();
            }
        }

        // Find #[label("...")]
        let mut label: Option<LitStr> = None;
        for Attribute { meta, .. } in &variant.attrs {
            if meta.path().is_ident("label") {
                match meta {
                    syn::Meta::List(list) => {
                        let lit = syn::parse2::<LitStr>(list.tokens.clone()).map_err(|e| {
                            syn::Error::new(list.span(), format!("invalid label: {e}"))
                        });
                        match lit {
                            Ok(l) => label = Some(l),
                            Err(err) => return err.to_compile_error().into(),
                        }
                    }
                    _ => {
                        return syn::Error::new(meta.span(), "use #[label(\"<name>\")]")
                            .to_compile_error()
                            .into();
                    }
                }
            }
        }

        let ident = &variant.ident;
        let label = label.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
        idents.push(ident.clone());
        labels.push(label);
    }

    let ranks = 0..idents.len();

    let expanded = quote! {
        impl ::gachabox::Category for #enum_ident {
            const ALL: &'static [Self] = &[
                #(Self::#idents),*
            ];

            fn name(&self) -> &'static str {
                match self {
                    #(Self::#idents => #labels,)*
                }
            }

            fn rank(&self) -> usize {
                match self {
                    #(Self::#idents => #ranks,)*
                }
            }
        }

        impl ::core::cmp::PartialOrd for #enum_ident {
            fn partial_cmp(&self, other: &Self) -> ::core::option::Option<::core::cmp::Ordering> {
                ::core::option::Option::Some(::core::cmp::Ord::cmp(self, other))
            }
        }

        impl ::core::cmp::Ord for #enum_ident {
            fn cmp(&self, other: &Self) -> ::core::cmp::Ordering {
                ::gachabox::Category::rank(self).cmp(&::gachabox::Category::rank(other))
            }
        }
    };

    expanded.into()
}
