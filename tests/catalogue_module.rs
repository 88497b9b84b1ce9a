use vglaunch::catalogue::{get_catalogue, TemplateNode};

const KNOWN_SELECTORS: [&str; 3] = ["ubc-gif", "escript", "underworld"];
const CATEGORY_TITLES: [&str; 3] = [
    "UBC GIF Examples",
    "escript Examples",
    "Underworld Examples",
];

#[test]
fn catalogue_module_defaults_unknown_selectors_to_the_union() {
    for selector in ["", "matlab", "UBC GIF", "escript ", "Toolbox-9"] {
        let root = get_catalogue(selector);
        let titles: Vec<&str> = root.children().iter().map(TemplateNode::text).collect();
        assert_eq!(titles, CATEGORY_TITLES, "selector `{selector}`");
    }
}

#[test]
fn catalogue_module_matches_selectors_case_insensitively() {
    for selector in KNOWN_SELECTORS {
        let upper = selector.to_ascii_uppercase();
        assert_eq!(get_catalogue(selector), get_catalogue(&upper));
        assert_eq!(get_catalogue(selector).children().len(), 1);
    }
}

#[test]
fn catalogue_module_root_is_always_the_script_builder_category() {
    for selector in ["ubc-gif", "anything-else"] {
        let root = get_catalogue(selector);
        assert_eq!(root.text(), "Script Builder Components");
        assert!(!root.is_leaf());
    }
}

fn walk<'a>(node: &'a TemplateNode, leaves: &mut Vec<&'a TemplateNode>) {
    if node.is_leaf() {
        leaves.push(node);
    }
    for child in node.children() {
        walk(child, leaves);
    }
}

#[test]
fn catalogue_module_serializes_the_exact_node_shapes() {
    let root = get_catalogue("");
    let value = serde_json::to_value(&root).expect("encode catalogue");

    // Root category: no `type` tag, no leaf-only fields.
    let root_obj = value.as_object().expect("root object");
    let mut root_keys: Vec<&str> = root_obj.keys().map(String::as_str).collect();
    root_keys.sort_unstable();
    assert_eq!(root_keys, vec!["children", "expanded", "text"]);

    for category in value["children"].as_array().expect("categories") {
        let category_obj = category.as_object().expect("category object");
        assert_eq!(category_obj["type"], "category");
        assert_eq!(category_obj["expanded"], true);
        assert!(category_obj.get("id").is_none());
        assert!(category_obj.get("qtip").is_none());
        for leaf in category["children"].as_array().expect("leaves") {
            let leaf_obj = leaf.as_object().expect("leaf object");
            let mut leaf_keys: Vec<&str> = leaf_obj.keys().map(String::as_str).collect();
            leaf_keys.sort_unstable();
            assert_eq!(leaf_keys, vec!["id", "leaf", "qtip", "text", "type"]);
            assert_eq!(leaf_obj["type"], "s");
            assert_eq!(leaf_obj["leaf"], true);
        }
    }
}

#[test]
fn catalogue_module_lists_every_known_template_once() {
    let root = get_catalogue("");
    let mut leaves = Vec::new();
    walk(&root, &mut leaves);
    let ids: Vec<&str> = leaves.iter().filter_map(|leaf| leaf.template_id()).collect();
    assert_eq!(
        ids,
        vec![
            "ScriptBuilder.templates.UbcGravityTemplate",
            "ScriptBuilder.templates.UbcMagneticTemplate",
            "ScriptBuilder.templates.EScriptGravityTemplate",
            "ScriptBuilder.templates.UnderworldGocadTemplate",
        ]
    );
}
