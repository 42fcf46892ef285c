use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, Lit, Meta};

/// Derive macro that generates a columnar companion struct for collecting
/// per-day flux values. All fields in the source struct must be `f64`.
///
/// For `struct Fluxes { a: f64, b: f64 }` it emits `FluxesTimeseries` with
/// one `Vec<f64>` per field and:
/// - `with_capacity`, `push`, `len`, `is_empty`
/// - `column(name)` and `columns()` for name-based access (table writers,
///   Python dicts)
/// - `get(day)` to rebuild the flux record of one day
///
/// plus `Fluxes::field_names()`. Use
/// `#[fluxes(timeseries_name = "CustomName")]` to rename the companion.
#[proc_macro_derive(Fluxes, attributes(fluxes))]
pub fn derive_fluxes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let ts_name =
        extract_timeseries_name(input)?.unwrap_or_else(|| format_ident!("{}Timeseries", name));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Fluxes can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Fluxes can only be derived for structs",
            ))
        }
    };

    let mut idents: Vec<&Ident> = Vec::with_capacity(fields.len());
    for field in fields {
        if !is_f64_type(&field.ty) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "Fluxes derive: all fields must be f64",
            ));
        }
        if let Some(ident) = field.ident.as_ref() {
            idents.push(ident);
        }
    }

    let Some(first) = idents.first() else {
        return Err(syn::Error::new_spanned(
            name,
            "Fluxes struct must have at least one field",
        ));
    };

    let names: Vec<String> = idents.iter().map(|i| i.to_string()).collect();

    Ok(quote! {
        /// Columnar timeseries of per-day fluxes.
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct #ts_name {
            #(pub #idents: Vec<f64>,)*
        }

        impl #ts_name {
            /// Pre-allocate all columns for `n` days.
            pub fn with_capacity(n: usize) -> Self {
                Self {
                    #(#idents: Vec::with_capacity(n),)*
                }
            }

            /// Append one day's fluxes.
            pub fn push(&mut self, f: &#name) {
                #(self.#idents.push(f.#idents);)*
            }

            /// Number of days stored.
            pub fn len(&self) -> usize {
                self.#first.len()
            }

            /// Returns `true` if no days have been stored.
            pub fn is_empty(&self) -> bool {
                self.#first.is_empty()
            }

            /// Column by field name.
            pub fn column(&self, name: &str) -> Option<&[f64]> {
                match name {
                    #(#names => Some(self.#idents.as_slice()),)*
                    _ => None,
                }
            }

            /// All columns as (name, values), in declaration order.
            pub fn columns(&self) -> impl Iterator<Item = (&'static str, &[f64])> + '_ {
                [#((#names, self.#idents.as_slice())),*].into_iter()
            }

            /// Fluxes of day `index`, if stored.
            pub fn get(&self, index: usize) -> Option<#name> {
                if index >= self.len() {
                    return None;
                }
                Some(#name {
                    #(#idents: self.#idents[index],)*
                })
            }
        }

        impl #name {
            /// Field names of this flux struct, in declaration order.
            pub fn field_names() -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    })
}

fn extract_timeseries_name(input: &DeriveInput) -> syn::Result<Option<Ident>> {
    for attr in &input.attrs {
        if !attr.path().is_ident("fluxes") {
            continue;
        }
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("timeseries_name") => {
                    if let syn::Expr::Lit(expr_lit) = &nv.value {
                        if let Lit::Str(lit_str) = &expr_lit.lit {
                            return Ok(Some(format_ident!("{}", lit_str.value())));
                        }
                    }
                    return Err(syn::Error::new_spanned(
                        &nv.value,
                        "timeseries_name must be a string literal",
                    ));
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unknown fluxes attribute, expected timeseries_name = \"...\"",
                    ))
                }
            }
        }
    }
    Ok(None)
}

fn is_f64_type(ty: &syn::Type) -> bool {
    if let syn::Type::Path(type_path) = ty {
        type_path.path.is_ident("f64")
    } else {
        false
    }
}
