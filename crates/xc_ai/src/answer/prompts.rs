pub const SYSTEM_PROMPT: &str = "你是一个精通中国历史的专家，特别是关于析城山地区的历史。请根据提供的上下文信息回答用户的问题。如果上下文中没有答案，请利用你自己的知识回答，但要说明是基于通用知识。";

pub fn user_prompt(context: &str, query: &str) -> String {
    format!("上下文信息：\n{context}\n\n用户问题：{query}")
}
