use xc_ai::extract::{matching_categories, select_schema, SchemaCategory};

#[test]
fn war_dataset_selects_war_schema() {
    let schema = select_schema("18战争-总数据");
    assert_eq!(schema.category, SchemaCategory::War);
    assert_eq!(
        schema.field_names(),
        vec![
            "event_name",
            "dynasty",
            "start_year",
            "end_year",
            "participants",
            "location",
            "summary",
            "outcome"
        ]
    );
}

#[test]
fn marker_position_does_not_matter() {
    assert_eq!(select_schema("战争").category, SchemaCategory::War);
    assert_eq!(select_schema("总数据-战争").category, SchemaCategory::War);
    assert_eq!(select_schema("02水系-总数据和各朝代数据").category, SchemaCategory::River);
    assert_eq!(select_schema("07建制沿革 - 总数据和各朝代数据").category, SchemaCategory::Institution);
    assert_eq!(select_schema("11灾害").category, SchemaCategory::Disaster);
    assert_eq!(select_schema("05人口-明清").category, SchemaCategory::Population);
}

#[test]
fn unknown_names_fall_back_to_generic() {
    let schema = select_schema("15物产 - 总数据和各朝代数据");
    assert_eq!(schema.category, SchemaCategory::Generic);
    assert_eq!(
        schema.field_names(),
        vec!["subject", "dynasty", "year", "location", "category", "summary"]
    );
    assert!(schema.instruction_body().starts_with("请提取以下通用字段："));
}

#[test]
fn priority_order_resolves_multiple_markers() {
    // Population appears first in the name, but war has priority.
    let name = "人口与战争";
    assert_eq!(select_schema(name).category, SchemaCategory::War);
    assert_eq!(
        matching_categories(name),
        vec![SchemaCategory::War, SchemaCategory::Population]
    );
    assert_eq!(matching_categories("18战争-总数据"), vec![SchemaCategory::War]);
    assert!(matching_categories("15物产").is_empty());
}

#[test]
fn every_schema_asks_for_dynasty() {
    for category in [
        SchemaCategory::War,
        SchemaCategory::River,
        SchemaCategory::Institution,
        SchemaCategory::Disaster,
        SchemaCategory::Population,
        SchemaCategory::Generic,
    ] {
        assert!(category.fields().iter().any(|f| f.name == "dynasty"), "{category:?}");
    }
}

#[test]
fn instruction_body_lists_each_field() {
    let body = select_schema("02水系").instruction_body();
    assert!(body.starts_with("请提取以下字段："));
    assert!(body.contains("\n- \"river_name\": 河流或水系的专有名称。"));
    assert_eq!(body.lines().count(), 7);
}
