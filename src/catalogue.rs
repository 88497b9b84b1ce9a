use serde::Serialize;

/// The raw configuration for building the script builder template tree.
///
/// Category nodes carry ordered children; leaf nodes reference a single
/// script template by its opaque identifier. A node is never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TemplateNode {
    Category {
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        kind: Option<&'static str>,
        text: &'static str,
        expanded: bool,
        children: Vec<TemplateNode>,
    },
    Template {
        id: &'static str,
        #[serde(rename = "type")]
        kind: &'static str,
        text: &'static str,
        qtip: &'static str,
        leaf: bool,
    },
}

impl TemplateNode {
    fn category(text: &'static str, children: Vec<TemplateNode>) -> Self {
        TemplateNode::Category {
            kind: Some("category"),
            text,
            expanded: true,
            children,
        }
    }

    fn template(id: &'static str, text: &'static str, qtip: &'static str) -> Self {
        TemplateNode::Template {
            id,
            kind: "s",
            text,
            qtip,
            leaf: true,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            TemplateNode::Category { text, .. } | TemplateNode::Template { text, .. } => text,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TemplateNode::Template { .. })
    }

    pub fn children(&self) -> &[TemplateNode] {
        match self {
            TemplateNode::Category { children, .. } => children,
            TemplateNode::Template { .. } => &[],
        }
    }

    pub fn template_id(&self) -> Option<&str> {
        match self {
            TemplateNode::Template { id, .. } => Some(id),
            TemplateNode::Category { .. } => None,
        }
    }
}

/// Builds the template tree for the selected toolbox. Unrecognised selectors
/// fall back to every category group so the user still sees something useful.
pub fn get_catalogue(selected_toolbox: &str) -> TemplateNode {
    let children = match selected_toolbox.to_ascii_lowercase().as_str() {
        "ubc-gif" => vec![ubc_examples()],
        "escript" => vec![escript_examples()],
        "underworld" => vec![underworld_examples()],
        _ => vec![ubc_examples(), escript_examples(), underworld_examples()],
    };
    TemplateNode::Category {
        kind: None,
        text: "Script Builder Components",
        expanded: true,
        children,
    }
}

fn ubc_examples() -> TemplateNode {
    TemplateNode::category(
        "UBC GIF Examples",
        vec![
            TemplateNode::template(
                "ScriptBuilder.templates.UbcGravityTemplate",
                "Gravity Inversion",
                "Perform a gravity inversion using UBC GIF. Expects data in the form of a CSV file. Double click to use this example.",
            ),
            TemplateNode::template(
                "ScriptBuilder.templates.UbcMagneticTemplate",
                "Magnetic Inversion",
                "Perform a magnetic inversion using UBC GIF. Expects data in the form of a CSV file. Double click to use this example.",
            ),
        ],
    )
}

fn escript_examples() -> TemplateNode {
    TemplateNode::category(
        "escript Examples",
        vec![TemplateNode::template(
            "ScriptBuilder.templates.EScriptGravityTemplate",
            "Gravity Inversion",
            "Perform a gravity inversion using escript. Expects data in the form of a NetCDF file. Double click to use this example.",
        )],
    )
}

fn underworld_examples() -> TemplateNode {
    TemplateNode::category(
        "Underworld Examples",
        vec![TemplateNode::template(
            "ScriptBuilder.templates.UnderworldGocadTemplate",
            "Gocad Simulation",
            "Perform an Underworld simulation using a Gocad Voxelset. Expects data in the form of a Gocad voxel set. Double click to use this example.",
        )],
    )
}
