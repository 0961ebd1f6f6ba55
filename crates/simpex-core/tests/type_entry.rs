use simpex_core::{EntryValues, ImpexError, ImpexType, MacroTable, Value};

const MACROS: &str = "$catalogVersion=catalogversion(catalog(id[default='simpexproducts']), version[default='staged'])[unique=true,default='simpexproducts:staged']";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn macros() -> MacroTable {
    MacroTable::parse(MACROS).unwrap()
}

fn product_type() -> ImpexType {
    ImpexType::with_macros(
        "Product",
        &[
            "code[unique=true]",
            "name[lang=en]",
            "name[lang=de]",
            "unit(code)",
            "$catalogVersion",
            "supercategories(code)",
        ],
        &macros(),
    )
    .unwrap()
}

fn product_row() -> Vec<&'static str> {
    vec![
        "555",
        "myproduct555",
        "meinproduct555",
        "pieces",
        "SimpexProducts:Online",
        "SampleCategory",
    ]
}

// ===========================================================================
// Construction
// ===========================================================================

#[test]
fn keyed_entry_resolves_qualified_names() {
    let mut product = ImpexType::new(
        "Product",
        &["code[unique=true]", "name[lang=en]", "name[lang=de]"],
    )
    .unwrap();
    let entry = product
        .add_entry(vec![("code", "333"), ("name[lang=de]", "MyName")])
        .unwrap();

    assert_eq!(entry.get("code").unwrap(), "333");
    assert_eq!(entry.get("name[lang=de]").unwrap(), "MyName");
    assert_eq!(entry.get("name[lang=en]").unwrap(), "");
    assert!(matches!(
        entry.get("name"),
        Err(ImpexError::AmbiguousName { .. })
    ));
    assert_eq!(product.entries().len(), 1);
}

#[test]
fn keyed_entry_with_unknown_attribute_fails() {
    let mut product = ImpexType::new(
        "Product",
        &["code[unique=true]", "name[lang=en]", "name[lang=de]"],
    )
    .unwrap();
    let err = product.add_entry(vec![("co", "555")]).unwrap_err();
    assert!(matches!(err, ImpexError::ShapeMismatch { .. }));
    assert!(product.entries().is_empty());
}

#[test]
fn keyed_entry_rejects_the_same_column_twice() {
    let product = ImpexType::new("Product", &["code[unique=true]"]).unwrap();
    let err = product
        .build_entry(vec![("code", "1"), ("code[unique=true]", "2")])
        .unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn positional_entry_assigns_columns_in_order() {
    let mut product = product_type();
    let entry = product.add_entry(product_row()).unwrap();

    assert_eq!(entry.get("name[lang=en]").unwrap(), "myproduct555");
    assert_eq!(entry.get("name[lang=de]").unwrap(), "meinproduct555");
    assert_eq!(entry.get("supercategories(code)").unwrap(), "SampleCategory");
}

#[test]
fn wrong_number_of_values_reports_counts() {
    let mut too_few =
        ImpexType::new("Language", &["isocode[unique=true]", "active", "someOtherAtt"]).unwrap();
    let err = too_few.add_entry(vec!["de", "true"]).unwrap_err();
    assert_eq!(
        err,
        ImpexError::ShapeMismatch {
            type_name: "Language".into(),
            reason: "expected 3 values, given 2".into(),
        }
    );
    assert!(too_few.entries().is_empty());

    let mut too_many = ImpexType::new("Language", &["isocode[unique=true]", "active"]).unwrap();
    assert!(too_many.add_entry(vec!["de", "true", "xxx"]).is_err());
}

#[test]
fn type_without_attributes_is_rejected() {
    let err = ImpexType::new::<&str>("Empty", &[]).unwrap_err();
    assert!(matches!(err, ImpexError::ShapeMismatch { .. }));
}

#[test]
fn entry_built_for_another_type_cannot_be_registered() {
    let a = ImpexType::new("A", &["code"]).unwrap();
    let mut b = ImpexType::new("B", &["code"]).unwrap();
    let entry = a.build_entry(vec!["1"]).unwrap();
    assert!(b.register(entry).is_err());
    assert!(b.entries().is_empty());
}

#[test]
fn building_does_not_register_until_asked() {
    let mut product = ImpexType::new("Product", &["code"]).unwrap();
    let entry = product.build_entry(vec!["555"]).unwrap();
    assert!(product.entries().is_empty());
    product.register(entry).unwrap();
    assert_eq!(product.entries().len(), 1);
}

// ===========================================================================
// Value access
// ===========================================================================

#[test]
fn list_values_render_comma_joined() {
    let mut cv = ImpexType::new("CatalogVersion", &["languages(isocode)"]).unwrap();

    let entry = cv
        .add_entry(vec![Value::from(vec!["en", "de", "fr", "it"])])
        .unwrap();
    assert_eq!(entry.attr("languages").unwrap(), "en,de,fr,it");

    let entry = cv
        .add_entry(vec![Value::from(vec![Some("en"), None, Some("it")])])
        .unwrap();
    assert_eq!(entry.attr("languages").unwrap(), "en,it");
    assert_eq!(
        entry.values()[0],
        Value::List(vec![Some("en".into()), None, Some("it".into())])
    );
}

#[test]
fn fuzzy_names_match_base_names() {
    let mut product = product_type();
    let entry = product.add_entry(product_row()).unwrap();

    assert_eq!(entry.get("code").unwrap(), "555");
    assert_eq!(entry.get("unit").unwrap(), "pieces");
    assert_eq!(entry.get("supercategories").unwrap(), "SampleCategory");
    assert!(matches!(
        entry.get("supercat"),
        Err(ImpexError::UnresolvedName { .. })
    ));
}

#[test]
fn get_is_idempotent() {
    let mut product = product_type();
    let entry = product.add_entry(product_row()).unwrap();
    let first = entry.get("unit").unwrap();
    assert_eq!(entry.get("unit").unwrap(), first);
    assert_eq!(entry.get("name").unwrap_err(), entry.get("name").unwrap_err());
}

#[test]
fn accessors_follow_base_names() {
    let mut product = product_type();
    let entry = product.add_entry(product_row()).unwrap();

    assert_eq!(entry.attr("code").unwrap(), "555");
    assert_eq!(entry.attr("unit").unwrap(), "pieces");
    assert_eq!(entry.attr("supercategories").unwrap(), "SampleCategory");
    assert!(entry.attr("name").is_err());
}

#[test]
fn accessor_for_nested_and_qualified_column() {
    let mut product =
        ImpexType::new("Product", &["code[unique=true]", "catalog(id)[unique=true]"]).unwrap();
    let entry = product.add_entry(vec!["555", "myCatalogId"]).unwrap();
    assert_eq!(entry.attr("catalog").unwrap(), "myCatalogId");
}

#[test]
fn accessor_for_macro_column_uses_macro_name() {
    let macros = MacroTable::parse("$catalogVersion=asdfadsfasdfasdf").unwrap();
    let mut product =
        ImpexType::with_macros("Product", &["code[unique=true]", "$catalogVersion"], &macros)
            .unwrap();
    let entry = product.add_entry(vec!["555", "myCatalogId"]).unwrap();
    assert_eq!(entry.attr("catalogVersion").unwrap(), "myCatalogId");
    assert_eq!(entry.get("$catalogVersion").unwrap(), "myCatalogId");
}

#[test]
fn catalog_version_specific_value() {
    let mut product =
        ImpexType::with_macros("Product", &["code[unique=true]", "$catalogVersion"], &macros())
            .unwrap();
    let entry = product.add_entry(vec!["555", "myCatalogId:staged"]).unwrap();
    assert_eq!(entry.cat_ver_specific("code").unwrap(), "555:myCatalogId:staged");
}

#[test]
fn catalog_version_falls_back_to_default_qualifier() {
    let mut product =
        ImpexType::with_macros("Product", &["code[unique=true]", "$catalogVersion"], &macros())
            .unwrap();
    let entry = product.add_entry(vec![("code", "777")]).unwrap();
    assert_eq!(
        entry.cat_ver_specific("code").unwrap(),
        "777:simpexproducts:staged"
    );
}

#[test]
fn catalog_version_split_over_two_columns() {
    let macros =
        MacroTable::parse("$catalogVersion=catalog(id) version[default='c:staged']").unwrap();
    let mut product = ImpexType::with_macros("P", &["code", "$catalogVersion"], &macros).unwrap();
    assert_eq!(
        product.header_line(),
        "INSERT_UPDATE P;code;catalog(id);version[default='c:staged']"
    );

    let defaulted = product.add_entry(vec![("code", "556")]).unwrap();
    assert_eq!(defaulted.cat_ver_specific("code").unwrap(), "556:c:staged");

    let filled = product.add_entry(vec!["557", "cat", "online"]).unwrap();
    assert_eq!(filled.cat_ver_specific("code").unwrap(), "557:cat:online");

    let half = product.add_entry(vec!["558", "cat", ""]).unwrap();
    assert!(matches!(
        half.cat_ver_specific("code"),
        Err(ImpexError::MalformedCatalogVersion { .. })
    ));
}

#[test]
fn catalog_version_macro_wider_than_a_pair_is_rejected() {
    let macros = MacroTable::parse("$catalogVersion=catalog(id) version active").unwrap();
    let err = ImpexType::with_macros("P", &["code", "$catalogVersion"], &macros).unwrap_err();
    assert!(matches!(err, ImpexError::ShapeMismatch { .. }));
}

#[test]
fn catalog_version_keeps_colons_in_version() {
    let mut product =
        ImpexType::with_macros("Product", &["code", "$catalogVersion"], &macros()).unwrap();
    let entry = product.add_entry(vec!["1", "cat:v:2"]).unwrap();
    assert_eq!(entry.cat_ver_specific("code").unwrap(), "1:cat:v:2");

    let entry = product.add_entry(vec!["2", "nocolon"]).unwrap();
    assert!(matches!(
        entry.cat_ver_specific("code"),
        Err(ImpexError::MalformedCatalogVersion { .. })
    ));
}

#[test]
fn catalog_version_requires_the_macro() {
    let mut product = ImpexType::new("Product", &["code[unique=true]", "someattr"]).unwrap();
    let entry = product.add_entry(vec!["555", "myCatalogId:staged"]).unwrap();
    assert_eq!(
        entry.cat_ver_specific("code").unwrap_err(),
        ImpexError::MissingCatalogVersion {
            type_name: "Product".into()
        }
    );
}

// ===========================================================================
// Registry
// ===========================================================================

#[test]
fn find_by_returns_all_matches() {
    let mut product = ImpexType::new("Product", &["code"]).unwrap();
    assert!(product.find_by("code", "555").unwrap().is_empty());

    product.add_entry(vec!["555"]).unwrap();
    product.add_entry(vec!["555"]).unwrap();
    product.add_entry(vec!["556"]).unwrap();

    assert_eq!(product.find_by("code", "555").unwrap().len(), 2);
    assert_eq!(product.find_by("code", "556").unwrap().len(), 1);
}

#[test]
fn unregister_by_removes_matches_and_keeps_order() {
    let mut product = ImpexType::new("Product", &["code", "name"]).unwrap();
    product.add_entry(vec!["557", "a"]).unwrap();
    product.add_entry(vec!["555", "b"]).unwrap();
    product.add_entry(vec!["556", "c"]).unwrap();

    assert_eq!(product.unregister_by("code", "555").unwrap(), 1);
    assert!(product.find_by("code", "555").unwrap().is_empty());

    let remaining: Vec<String> = product
        .entries()
        .iter()
        .map(|e| e.attr("code").unwrap())
        .collect();
    assert_eq!(remaining, vec!["557", "556"]);

    assert_eq!(product.unregister_by("code", "999").unwrap(), 0);
}

#[test]
fn registry_operations_need_a_resolvable_attribute() {
    let mut product = ImpexType::new("Product", &["code"]).unwrap();
    assert!(product.find_by("nope", "1").is_err());
    assert!(product.unregister_by("nope", "1").is_err());
}

#[test]
fn unique_index_groups_duplicate_keys() {
    let mut product = ImpexType::new("Product", &["code[unique=true]", "name"]).unwrap();
    product.add_entry(vec!["1", "a"]).unwrap();
    product.add_entry(vec!["2", "b"]).unwrap();
    product.add_entry(vec!["1", "c"]).unwrap();

    let index = product.unique_index();
    assert_eq!(index[&vec!["1".to_string()]], vec![0, 2]);
    assert_eq!(product.duplicate_keys(), vec![vec!["1".to_string()]]);
}

#[test]
fn rows_from_json_feed_the_same_validation() {
    let mut product = ImpexType::new("Product", &["code[unique=true]", "name[lang=en]"]).unwrap();
    let row =
        EntryValues::from_json("Product", &serde_json::json!({"code": 12, "name": null})).unwrap();
    let entry = product.add_entry(row).unwrap();
    assert_eq!(entry.get("code").unwrap(), "12");
    assert!(entry.value("name").unwrap().is_null());
}
