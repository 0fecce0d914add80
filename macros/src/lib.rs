//! Derive macros for todoapp actions
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Classifies action variants as commands or events
//!
//! # Example
//!
//! ```ignore
//! use todoapp_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[command]
//!     Delete { id: u64 },
//!
//!     #[event]
//!     Deleted { id: u64, ok: bool },
//! }
//!
//! assert!(TodoAction::Delete { id: 1 }.is_command());
//! assert!(TodoAction::Deleted { id: 1, ok: true }.is_event());
//! assert_eq!(TodoAction::Delete { id: 1 }.name(), "Delete");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as Tokens;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Variant};

/// Derive helpers on an action enum
///
/// Variants tagged `#[command]` are user intents, variants tagged `#[event]`
/// report effect results; untagged variants are neither. The derive adds
/// `is_command()`, `is_event()` and `name()` (the variant name, for logs).
///
/// Applying it to anything but an enum, or tagging a variant with both
/// attributes, is a compile error.
#[proc_macro_derive(Action, attributes(command, event))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input).unwrap_or_else(syn::Error::into_compile_error).into()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Command,
    Event,
    Untagged,
}

impl Role {
    fn of(variant: &Variant) -> syn::Result<Self> {
        let tagged = |name: &str| variant.attrs.iter().any(|attr| attr.path().is_ident(name));
        match (tagged("command"), tagged("event")) {
            (true, true) => Err(syn::Error::new_spanned(
                &variant.ident,
                "Variant cannot be both #[command] and #[event]",
            )),
            (true, false) => Ok(Self::Command),
            (false, true) => Ok(Self::Event),
            (false, false) => Ok(Self::Untagged),
        }
    }
}

fn expand(input: &DeriveInput) -> syn::Result<Tokens> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    let variants = data
        .variants
        .iter()
        .map(|variant| Ok((pattern(variant), variant.ident.to_string(), Role::of(variant)?)))
        .collect::<syn::Result<Vec<_>>>()?;

    let matching = |role: Role| {
        let patterns: Vec<&Tokens> = variants
            .iter()
            .filter(|(_, _, r)| *r == role)
            .map(|(p, _, _)| p)
            .collect();
        if patterns.is_empty() {
            quote! { false }
        } else {
            quote! { matches!(self, #(#patterns)|*) }
        }
    };
    let is_command = matching(Role::Command);
    let is_event = matching(Role::Event);
    let name_arms = variants.iter().map(|(p, name, _)| quote! { #p => #name, });

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Whether this action is a user intent
            #[must_use]
            pub const fn is_command(&self) -> bool {
                #is_command
            }

            /// Whether this action reports an effect result
            #[must_use]
            pub const fn is_event(&self) -> bool {
                #is_event
            }

            /// Variant name
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    })
}

/// `Self::Variant`, `Self::Variant(..)` or `Self::Variant { .. }`
fn pattern(variant: &Variant) -> Tokens {
    let ident = &variant.ident;
    match variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}
