use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct HeterogenTemplateFile {
    pub info: TemplateInfo,
    #[serde(default)]
    pub topology: TemplateTopology,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TemplateTopology {
    #[serde(default)]
    pub atoms: Vec<String>,
    #[serde(default)]
    pub bonds: Vec<[String; 2]>,
}
