use std::borrow::Cow;

use proc_macro2::{TokenStream, Ident, Span};
use syn::{DeriveInput, Data, Fields, DataStruct, FieldsNamed, FieldsUnnamed};
use quote::quote;

fn read_derive_impl(input: &DeriveInput) -> TokenStream {
	let (fields, tuple) = match &input.data {
		Data::Struct(DataStruct { fields: Fields::Named(FieldsNamed { named, .. }), .. }) => (named, false),
		Data::Struct(DataStruct { fields: Fields::Unnamed(FieldsUnnamed { unnamed, .. }), .. }) => (unnamed, true),
		_ => unimplemented!("only tuple struct or struct with named fields supported"),
	};
	let mut body = quote! {};
	let mut initializer = quote! {};
	for (index, field) in fields.iter().enumerate() {
		let mut field_expr = quote! { tr_level::read::Readable::read(cursor, generation, diagnostics)? };
		let mut skip = 0u64;
		for attr in &field.attrs {
			if let Some(ident) = attr.path().get_ident() {
				match ident.to_string().as_str() {
					"list_u16" => field_expr = quote! {//u16 count, then that many items
						tr_level::read::read_list::<_, _, u16>(cursor, generation, diagnostics)?
					},
					"list_u32" => field_expr = quote! {//u32 count, then that many items
						tr_level::read::read_list::<_, _, u32>(cursor, generation, diagnostics)?
					},
					"skip_1" => skip = 1,//padding before the field
					"skip_2" => skip = 2,
					"skip_4" => skip = 4,
					_ => {},
				}
			}
		}
		if skip > 0 {
			field_expr = quote! {{
				cursor.skip(#skip)?;
				#field_expr
			}};
		}
		let field_ident = match &field.ident {
			Some(field_ident) => Cow::Borrowed(field_ident),
			None => Cow::Owned(Ident::new(&format!("field{}", index), Span::call_site())),
		};
		body = quote! {
			#body
			let #field_ident = #field_expr;
		};
		initializer = quote! { #initializer #field_ident, };
	}
	initializer = if tuple { quote! { (#initializer) } } else { quote! { {#initializer} } };
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
	let type_name = &input.ident;
	quote! {
		impl #impl_generics tr_level::read::Readable for #type_name #ty_generics #where_clause {
			#[allow(unused_variables)]
			fn read<R: std::io::Read + std::io::Seek>(
				cursor: &mut tr_level::ByteCursor<R>,
				generation: tr_level::Generation,
				diagnostics: &mut tr_level::Diagnostics,
			) -> tr_level::Result<Self> {
				#body
				Ok(#type_name #initializer)
			}
		}
	}
}

/// Sequential field-by-field reader for fixed-layout records.
#[proc_macro_derive(
	Readable,
	attributes(
		list_u16,
		list_u32,
		skip_1,
		skip_2,
		skip_4,
	)
)]
pub fn read_derive(tokens: proc_macro::TokenStream) -> proc_macro::TokenStream {
	read_derive_impl(&syn::parse_macro_input!(tokens)).into()
}
