use super::schema::ExtractionSchema;

pub fn extraction_prompt(schema: &ExtractionSchema, dataset_name: &str, context: &str) -> String {
    // Hard rules:
    // - dynasty comes from the period/dynasty column when one exists.
    // - anything not present in the context is null, never guessed.
    format!(
        r#"你是一个极其严谨的中国历史数据分析师。你的任务是基于下面提供的 **完整上下文数据**，严格按照指定的JSON格式提取信息。
**核心规则：**
1.  **优先使用 '时期' 或 '朝代' 字段** 来确定 `dynasty`。
2.  如果上下文中没有明确提供某个字段的信息，该字段的值必须为 `null`。
3.  **绝对不允许** 猜测或编造任何在上下文中不存在的信息。

文件上下文: {dataset_name}

{fields}

请根据以下 **完整上下文数据** 进行分析和提取:
---
{context}
---

只输出一个JSON对象，不要输出任何其他文字。
JSON输出:"#,
        fields = schema.instruction_body(),
    )
}
