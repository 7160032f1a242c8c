use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaCategory {
    War,
    River,
    Institution,
    Disaster,
    Population,
    Generic,
}

/// Dataset-name markers in priority order. The first contained marker wins.
pub const CATEGORY_MARKERS: &[(&str, SchemaCategory)] = &[
    ("战争", SchemaCategory::War),
    ("水系", SchemaCategory::River),
    ("建制沿革", SchemaCategory::Institution),
    ("灾害", SchemaCategory::Disaster),
    ("人口", SchemaCategory::Population),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
}

const fn field(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec { name, description }
}

const WAR_FIELDS: &[FieldSpec] = &[
    field("event_name", "战争或军事冲突的明确名称。如果文本只描述了状况而无具体名称，则为 null。"),
    field("dynasty", "所属朝代。"),
    field("start_year", "开始年份 (仅数字，公元纪年)。"),
    field("end_year", "结束年份 (仅数字，如果单一年份则与开始年份相同)。"),
    field("participants", "主要参与方 (数组)。"),
    field("location", "主要发生地点。"),
    field("summary", "对事件的简要、客观概述。"),
    field("outcome", "战争或事件的明确结果。"),
];

const RIVER_FIELDS: &[FieldSpec] = &[
    field("river_name", "河流或水系的专有名称。"),
    field("dynasty", "所属朝代。"),
    field("change_type", "变化类型 (例如: \"改道\", \"开凿\", \"淤塞\", \"功能变更\")。"),
    field("location", "涉及的具体地理位置。"),
    field("description", "对变化的客观描述。"),
    field("impact", "变化带来的直接影响。"),
];

const INSTITUTION_FIELDS: &[FieldSpec] = &[
    field("institution_name", "机构或制度的专有名称 (例如: \"中都警巡院\")。"),
    field("dynasty", "所属朝代。"),
    field("year", "设立或变更的年份 (仅数字)。"),
    field("location", "所属行政区划或地点。"),
    field("function", "机构的职能或制度的核心内容。"),
    field("change_description", "对设立、变更或废除的客观描述。"),
];

const DISASTER_FIELDS: &[FieldSpec] = &[
    field("disaster_type", "灾害类型 (例如: \"洪水\", \"地震\", \"旱灾\", \"蝗灾\")。"),
    field("dynasty", "所属朝代。"),
    field("year", "发生年份 (仅数字)。"),
    field("location", "发生地点。"),
    field("description", "对灾害情况的客观描述。"),
    field("impact", "灾害造成的影响，如伤亡、经济损失等。"),
];

const POPULATION_FIELDS: &[FieldSpec] = &[
    field("subject", "描述的主体 (例如: \"总人口\", \"特定区域人口\", \"流民\")。"),
    field("dynasty", "所属朝代。"),
    field("year", "数据对应的年份 (仅数字)。"),
    field("population_number", "人口数量 (仅数字，如果文本中是“户”，请估算或注明)。"),
    field("change_description", "对人口变化的描述 (例如: \"增长\", \"减少\", \"迁徙\")。"),
    field("source_text", "引用来源的简要说明。"),
];

const GENERIC_FIELDS: &[FieldSpec] = &[
    field("subject", "文本描述的核心主题或对象。"),
    field("dynasty", "所属朝代。"),
    field("year", "事件年份 (仅数字)。"),
    field("location", "地点。"),
    field("category", "类别 (例如: \"政治\", \"经济\", \"文化\", \"建筑\")。"),
    field("summary", "对文本内容的客观摘要。"),
];

impl SchemaCategory {
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            SchemaCategory::War => WAR_FIELDS,
            SchemaCategory::River => RIVER_FIELDS,
            SchemaCategory::Institution => INSTITUTION_FIELDS,
            SchemaCategory::Disaster => DISASTER_FIELDS,
            SchemaCategory::Population => POPULATION_FIELDS,
            SchemaCategory::Generic => GENERIC_FIELDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSchema {
    pub category: SchemaCategory,
    pub fields: &'static [FieldSpec],
}

impl ExtractionSchema {
    pub fn for_category(category: SchemaCategory) -> Self {
        Self {
            category,
            fields: category.fields(),
        }
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Field list rendered as the schema-specific part of the instruction.
    pub fn instruction_body(&self) -> String {
        let intro = match self.category {
            SchemaCategory::Generic => "请提取以下通用字段：",
            _ => "请提取以下字段：",
        };
        let mut out = String::from(intro);
        for f in self.fields {
            out.push_str(&format!("\n- \"{}\": {}", f.name, f.description));
        }
        out
    }
}

/// Pick the schema for a dataset by name.
pub fn select_schema(dataset_name: &str) -> ExtractionSchema {
    let category = CATEGORY_MARKERS
        .iter()
        .find(|(marker, _)| dataset_name.contains(marker))
        .map(|(_, category)| *category)
        .unwrap_or(SchemaCategory::Generic);
    ExtractionSchema::for_category(category)
}

/// Every category whose marker occurs in the name, in priority order.
///
/// More than one entry means the name is ambiguous and only the first applies.
pub fn matching_categories(dataset_name: &str) -> Vec<SchemaCategory> {
    CATEGORY_MARKERS
        .iter()
        .filter(|(marker, _)| dataset_name.contains(marker))
        .map(|(_, category)| *category)
        .collect()
}
