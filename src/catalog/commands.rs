//! The closed set of commands the plugin understands.
//!
//! Every [`Command`] variant maps to one static [`CommandSpec`]: the tool name
//! exposed to MCP clients, the kebab-case `type` sent on the wire, a
//! description, and the input shape. Lookup by name happens only in
//! [`Command::from_name`].

use serde_json::Value;

use crate::catalog::schema::{array_of, optional, required, Field, Shape};

/// Static description of one command.
#[derive(Debug)]
pub struct CommandSpec {
    /// Tool name, e.g. `figma_create_rectangle`.
    pub name: &'static str,
    /// Wire command type, e.g. `create-rectangle`.
    pub wire_type: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Declared arguments.
    pub input: &'static [Field],
}

// =============================================================================
// Shared argument shapes
// =============================================================================

const PAINTS: Shape = array_of(&Shape::Any);
const NODE_IDS: Shape = array_of(&Shape::String);
const DASH_PATTERN: Shape = array_of(&Shape::Number);

const STYLE_KIND: Shape = Shape::Enum(&["PAINT", "TEXT", "EFFECT", "GRID"]);
const STYLE_TARGET: Shape = Shape::Enum(&["fill", "stroke", "text", "effect", "grid"]);
const VARIABLE_TYPE: Shape = Shape::Enum(&["COLOR", "FLOAT", "STRING", "BOOLEAN"]);
const TEXT_CASE: Shape = Shape::Enum(&["ORIGINAL", "UPPER", "LOWER", "TITLE"]);
const TEXT_DECORATION: Shape = Shape::Enum(&["NONE", "UNDERLINE", "STRIKETHROUGH"]);

const FONT_NAME: Shape = Shape::Object(&[
    required("family", Shape::String, ""),
    required("style", Shape::String, ""),
]);

const LETTER_SPACING: Shape = Shape::Object(&[
    required("value", Shape::Number, ""),
    required("unit", Shape::Enum(&["PIXELS", "PERCENT"]), ""),
]);

const OFFSET: Shape = Shape::Object(&[
    required("x", Shape::Number, ""),
    required("y", Shape::Number, ""),
]);

const EFFECT_TYPE: Shape = Shape::Enum(&["DROP_SHADOW", "INNER_SHADOW", "LAYER_BLUR", "BACKGROUND_BLUR"]);

const EFFECT: Shape = Shape::Object(&[
    required("type", EFFECT_TYPE, ""),
    optional("color", Shape::String, "Hex color for shadows (e.g., \"#000000\")"),
    optional("opacity", Shape::Number, "Shadow opacity 0-1 (default 0.25)"),
    optional("offset", OFFSET, "Shadow offset in pixels"),
    required("radius", Shape::Number, "Blur radius in pixels"),
    optional("spread", Shape::Number, "Shadow spread in pixels"),
    optional("visible", Shape::Boolean, ""),
]);

const LAYOUT_GRID: Shape = Shape::Object(&[
    required("pattern", Shape::Enum(&["COLUMNS", "ROWS", "GRID"]), ""),
    optional("sectionSize", Shape::Number, "Column/row width or grid size"),
    optional("count", Shape::Number, "Number of columns/rows"),
    optional("offset", Shape::Number, "Offset from edge"),
    optional("gutterSize", Shape::Number, "Space between columns/rows"),
    optional("alignment", Shape::Enum(&["MIN", "MAX", "STRETCH", "CENTER"]), ""),
    optional("color", Shape::String, "Grid color (hex)"),
    optional("visible", Shape::Boolean, ""),
]);

const STYLE_PROPERTIES: Shape = Shape::Object(&[
    optional("paints", PAINTS, "For PAINT: Array of paint objects or hex strings (e.g., [\"#FF0000\"])"),
    optional("fontSize", Shape::Number, "For TEXT: Font size in pixels"),
    optional("fontName", FONT_NAME, "For TEXT: Font family and style"),
    optional("lineHeight", Shape::Any, "For TEXT: Line height - {unit: \"AUTO\"} or {value: 24, unit: \"PIXELS\"}"),
    optional("letterSpacing", LETTER_SPACING, "For TEXT: Letter spacing"),
    optional("textCase", TEXT_CASE, "For TEXT: Text case transformation"),
    optional("textDecoration", TEXT_DECORATION, "For TEXT: Text decoration"),
    optional("effects", array_of(&EFFECT), "For EFFECT: Array of effects"),
    optional("layoutGrids", array_of(&LAYOUT_GRID), "For GRID: Array of layout grids"),
]);

const STYLE_PROPERTY_UPDATES: Shape = Shape::Object(&[
    optional("paints", PAINTS, ""),
    optional("fontSize", Shape::Number, ""),
    optional("fontName", FONT_NAME, ""),
    optional("lineHeight", Shape::Any, ""),
    optional("letterSpacing", LETTER_SPACING, ""),
    optional("textCase", TEXT_CASE, ""),
    optional("textDecoration", TEXT_DECORATION, ""),
    optional("effects", array_of(&Shape::Any), ""),
    optional("layoutGrids", array_of(&Shape::Any), ""),
]);

const MODE: Shape = Shape::Object(&[required("name", Shape::String, "Mode name (e.g., \"Dark\")")]);

// =============================================================================
// Document operations
// =============================================================================

const GET_DOCUMENT_INFO: CommandSpec = CommandSpec {
    name: "figma_get_document_info",
    wire_type: "get-document-info",
    description: "Get information about the current Figma document including pages, selection, and structure",
    input: &[],
};

const GET_NODE: CommandSpec = CommandSpec {
    name: "figma_get_node",
    wire_type: "get-node",
    description: "Get detailed information about a specific node by ID",
    input: &[required("id", Shape::String, "The node ID to retrieve")],
};

// =============================================================================
// Create operations
// =============================================================================

const CREATE_FRAME: CommandSpec = CommandSpec {
    name: "figma_create_frame",
    wire_type: "create-frame",
    description: "Create a new frame (container) in Figma",
    input: &[
        optional("name", Shape::String, "Name of the frame"),
        optional("x", Shape::Number, "X position"),
        optional("y", Shape::Number, "Y position"),
        optional("width", Shape::Number, "Width in pixels"),
        optional("height", Shape::Number, "Height in pixels"),
        optional("fills", PAINTS, "Fill colors (hex strings or fill objects)"),
        optional("cornerRadius", Shape::Number, "Uniform corner radius in pixels"),
        optional("topLeftRadius", Shape::Number, "Top-left corner radius"),
        optional("topRightRadius", Shape::Number, "Top-right corner radius"),
        optional("bottomLeftRadius", Shape::Number, "Bottom-left corner radius"),
        optional("bottomRightRadius", Shape::Number, "Bottom-right corner radius"),
        optional("parent", Shape::String, "Parent node ID (defaults to current page)"),
    ],
};

const CREATE_RECTANGLE: CommandSpec = CommandSpec {
    name: "figma_create_rectangle",
    wire_type: "create-rectangle",
    description: "Create a rectangle shape",
    input: &[
        optional("name", Shape::String, ""),
        optional("x", Shape::Number, ""),
        optional("y", Shape::Number, ""),
        optional("width", Shape::Number, ""),
        optional("height", Shape::Number, ""),
        optional("fills", PAINTS, ""),
        optional("cornerRadius", Shape::Number, "Corner radius in pixels"),
        optional("parent", Shape::String, ""),
    ],
};

const CREATE_TEXT: CommandSpec = CommandSpec {
    name: "figma_create_text",
    wire_type: "create-text",
    description: "Create a text layer",
    input: &[
        required("characters", Shape::String, "The text content"),
        optional("name", Shape::String, ""),
        optional("x", Shape::Number, ""),
        optional("y", Shape::Number, ""),
        optional("fontSize", Shape::Number, "Font size in pixels"),
        optional("fontName", FONT_NAME, ""),
        optional("fills", PAINTS, ""),
        optional("parent", Shape::String, ""),
    ],
};

const CREATE_ELLIPSE: CommandSpec = CommandSpec {
    name: "figma_create_ellipse",
    wire_type: "create-ellipse",
    description: "Create an ellipse/circle shape",
    input: &[
        optional("name", Shape::String, ""),
        optional("x", Shape::Number, ""),
        optional("y", Shape::Number, ""),
        optional("width", Shape::Number, ""),
        optional("height", Shape::Number, ""),
        optional("fills", PAINTS, ""),
        optional("parent", Shape::String, ""),
    ],
};

const CREATE_COMPONENT: CommandSpec = CommandSpec {
    name: "figma_create_component",
    wire_type: "create-component",
    description: "Create a reusable component",
    input: &[
        required("name", Shape::String, "Component name"),
        optional("width", Shape::Number, ""),
        optional("height", Shape::Number, ""),
        optional("parent", Shape::String, ""),
    ],
};

// =============================================================================
// Modify operations
// =============================================================================

const MODIFY_NODE: CommandSpec = CommandSpec {
    name: "figma_modify_node",
    wire_type: "modify-node",
    description: "Modify properties of an existing node",
    input: &[
        required("id", Shape::String, "Node ID to modify"),
        optional("name", Shape::String, ""),
        optional("x", Shape::Number, ""),
        optional("y", Shape::Number, ""),
        optional("width", Shape::Number, ""),
        optional("height", Shape::Number, ""),
        optional("fills", PAINTS, ""),
        optional("opacity", Shape::Number, "Opacity 0-1"),
        optional("visible", Shape::Boolean, ""),
        optional("locked", Shape::Boolean, ""),
        optional("cornerRadius", Shape::Number, "Uniform corner radius (frames, rectangles, components)"),
        optional("topLeftRadius", Shape::Number, "Top-left corner radius"),
        optional("topRightRadius", Shape::Number, "Top-right corner radius"),
        optional("bottomLeftRadius", Shape::Number, "Bottom-left corner radius"),
        optional("bottomRightRadius", Shape::Number, "Bottom-right corner radius"),
        optional("rotation", Shape::Number, "Rotation in degrees (counterclockwise)"),
    ],
};

const DELETE_NODE: CommandSpec = CommandSpec {
    name: "figma_delete_node",
    wire_type: "delete-node",
    description: "Delete a node from the document",
    input: &[required("id", Shape::String, "Node ID to delete")],
};

const APPLY_AUTO_LAYOUT: CommandSpec = CommandSpec {
    name: "figma_apply_auto_layout",
    wire_type: "apply-auto-layout",
    description: "Apply Auto Layout to a frame for responsive design",
    input: &[
        required("id", Shape::String, "Frame ID to apply Auto Layout to"),
        optional("layoutMode", Shape::Enum(&["HORIZONTAL", "VERTICAL"]), ""),
        optional("primaryAxisSizingMode", Shape::Enum(&["FIXED", "AUTO"]), ""),
        optional("counterAxisSizingMode", Shape::Enum(&["FIXED", "AUTO"]), ""),
        optional("paddingLeft", Shape::Number, ""),
        optional("paddingRight", Shape::Number, ""),
        optional("paddingTop", Shape::Number, ""),
        optional("paddingBottom", Shape::Number, ""),
        optional("itemSpacing", Shape::Number, "Space between items"),
        optional(
            "primaryAxisAlignItems",
            Shape::Enum(&["MIN", "CENTER", "MAX", "SPACE_BETWEEN"]),
            "",
        ),
        optional("counterAxisAlignItems", Shape::Enum(&["MIN", "CENTER", "MAX"]), ""),
    ],
};

// =============================================================================
// Style operations
// =============================================================================

const CREATE_STYLE: CommandSpec = CommandSpec {
    name: "figma_create_style",
    wire_type: "create-style",
    description: "Create a reusable style (paint/color, text, effect, or grid). \
                  Styles allow consistent design tokens across your document.",
    input: &[
        required("type", STYLE_KIND, "Style type"),
        required(
            "name",
            Shape::String,
            "Style name (can include \"/\" for grouping, e.g., \"Colors/Primary/Blue\")",
        ),
        optional("description", Shape::String, "Style description for documentation"),
        required("properties", STYLE_PROPERTIES, "Style properties based on type"),
    ],
};

const GET_STYLE: CommandSpec = CommandSpec {
    name: "figma_get_style",
    wire_type: "get-style",
    description: "Get a style by ID and retrieve its properties",
    input: &[required("id", Shape::String, "Style ID")],
};

const LIST_STYLES: CommandSpec = CommandSpec {
    name: "figma_list_styles",
    wire_type: "list-styles",
    description: "List all local styles in the document, optionally filtered by type",
    input: &[optional("type", STYLE_KIND, "Filter by style type")],
};

const UPDATE_STYLE: CommandSpec = CommandSpec {
    name: "figma_update_style",
    wire_type: "update-style",
    description: "Update an existing style's properties",
    input: &[
        required("id", Shape::String, "Style ID to update"),
        optional("name", Shape::String, "New style name"),
        optional("description", Shape::String, "New style description"),
        optional("properties", STYLE_PROPERTY_UPDATES, "Properties to update"),
    ],
};

const DELETE_STYLE: CommandSpec = CommandSpec {
    name: "figma_delete_style",
    wire_type: "delete-style",
    description: "Delete a style from the document. Nodes using this style will retain \
                  their appearance but lose the style link.",
    input: &[required("id", Shape::String, "Style ID to delete")],
};

const APPLY_STYLE: CommandSpec = CommandSpec {
    name: "figma_apply_style",
    wire_type: "apply-style",
    description: "Apply a style to a node. The style type must match the node capabilities \
                  (e.g., paint styles for fills, text styles for text nodes).",
    input: &[
        required("nodeId", Shape::String, "Node ID to apply style to"),
        required("styleId", Shape::String, "Style ID to apply"),
        required("styleType", STYLE_TARGET, "What aspect to apply the style to"),
    ],
};

const GET_NODE_STYLES: CommandSpec = CommandSpec {
    name: "figma_get_node_styles",
    wire_type: "get-node-styles",
    description: "Get all styles currently applied to a node",
    input: &[required("nodeId", Shape::String, "Node ID")],
};

const DETACH_STYLE: CommandSpec = CommandSpec {
    name: "figma_detach_style",
    wire_type: "detach-style",
    description: "Detach a style from a node while keeping the appearance. The node will \
                  retain the visual properties but no longer be linked to the style.",
    input: &[
        required("nodeId", Shape::String, "Node ID"),
        required("styleType", STYLE_TARGET, "Which style aspect to detach"),
    ],
};

// =============================================================================
// Selection and export
// =============================================================================

const GET_SELECTION: CommandSpec = CommandSpec {
    name: "figma_get_selection",
    wire_type: "get-selection",
    description: "Get currently selected nodes",
    input: &[],
};

const SET_SELECTION: CommandSpec = CommandSpec {
    name: "figma_set_selection",
    wire_type: "set-selection",
    description: "Set selection to specific nodes",
    input: &[required("ids", NODE_IDS, "Array of node IDs to select")],
};

const EXPORT_NODE: CommandSpec = CommandSpec {
    name: "figma_export_node",
    wire_type: "export-node",
    description: "Export a node as an image",
    input: &[
        required("id", Shape::String, "Node ID to export"),
        optional("format", Shape::Enum(&["PNG", "JPG", "SVG", "PDF"]), ""),
        optional("scale", Shape::Number, "Export scale (1, 2, 3, etc.)"),
    ],
};

// =============================================================================
// Components and variants
// =============================================================================

const CREATE_COMPONENT_SET: CommandSpec = CommandSpec {
    name: "figma_create_component_set",
    wire_type: "create-component-set",
    description: "Create a component set (variant group) from existing components. Components \
                  should have names following the \"Property=Value\" convention \
                  (e.g., \"Size=Large, State=Default\").",
    input: &[required(
        "componentIds",
        NODE_IDS,
        "Array of component IDs to combine as variants",
    )],
};

const ADD_VARIANT: CommandSpec = CommandSpec {
    name: "figma_add_variant",
    wire_type: "add-variant",
    description: "Add a new variant to an existing component set",
    input: &[
        required("componentSetId", Shape::String, "ID of the component set to add variant to"),
        optional(
            "name",
            Shape::String,
            "Variant name following Property=Value convention (e.g., \"Size=Large, State=Hover\")",
        ),
    ],
};

const CREATE_COMPONENT_FROM_NODE: CommandSpec = CommandSpec {
    name: "figma_create_component_from_node",
    wire_type: "create-component-from-node",
    description: "Convert an existing node into a component, preserving all properties and \
                  children. Similar to \"Create component\" in Figma toolbar.",
    input: &[required("nodeId", Shape::String, "ID of the node to convert to a component")],
};

// =============================================================================
// Strokes, effects and text styling
// =============================================================================

const SET_STROKES: CommandSpec = CommandSpec {
    name: "figma_set_strokes",
    wire_type: "set-strokes",
    description: "Set stroke (border) properties on a node",
    input: &[
        required("id", Shape::String, "Node ID"),
        required(
            "strokes",
            PAINTS,
            "Stroke paints array - hex strings or paint objects (same format as fills)",
        ),
        optional("strokeWeight", Shape::Number, "Stroke weight in pixels"),
        optional("strokeAlign", Shape::Enum(&["INSIDE", "OUTSIDE", "CENTER"]), "Stroke alignment"),
        optional("dashPattern", DASH_PATTERN, "Dash pattern array, e.g., [10, 5] for dashed"),
    ],
};

const SET_EFFECTS: CommandSpec = CommandSpec {
    name: "figma_set_effects",
    wire_type: "set-effects",
    description: "Set effects (drop shadow, inner shadow, blur) on a node",
    input: &[
        required("id", Shape::String, "Node ID"),
        required("effects", array_of(&EFFECT), "Array of effects to apply"),
    ],
};

const SET_TEXT_STYLE: CommandSpec = CommandSpec {
    name: "figma_set_text_style",
    wire_type: "set-text-style",
    description: "Set advanced text styling properties on a text node",
    input: &[
        required("id", Shape::String, "Text node ID"),
        optional(
            "fontName",
            FONT_NAME,
            "Font family and style (e.g., {family: \"Inter\", style: \"Bold\"})",
        ),
        optional("fontSize", Shape::Number, ""),
        optional(
            "textAlignHorizontal",
            Shape::Enum(&["LEFT", "CENTER", "RIGHT", "JUSTIFIED"]),
            "",
        ),
        optional("textAlignVertical", Shape::Enum(&["TOP", "CENTER", "BOTTOM"]), ""),
        optional(
            "lineHeight",
            Shape::Any,
            "Line height - {unit: \"AUTO\"} or {value: 24, unit: \"PIXELS\"} or {value: 150, unit: \"PERCENT\"}",
        ),
        optional("letterSpacing", LETTER_SPACING, ""),
        optional("textDecoration", TEXT_DECORATION, ""),
        optional("textCase", TEXT_CASE, ""),
        optional(
            "textAutoResize",
            Shape::Enum(&["NONE", "WIDTH_AND_HEIGHT", "HEIGHT", "TRUNCATE"]),
            "",
        ),
    ],
};

// =============================================================================
// Node manipulation
// =============================================================================

const CLONE_NODE: CommandSpec = CommandSpec {
    name: "figma_clone_node",
    wire_type: "clone-node",
    description: "Clone (duplicate) a node. The clone appears in the same parent.",
    input: &[
        required("id", Shape::String, "Node ID to clone"),
        optional("name", Shape::String, "New name for the cloned node"),
        optional("x", Shape::Number, "X position for the clone"),
        optional("y", Shape::Number, "Y position for the clone"),
    ],
};

const GROUP_NODES: CommandSpec = CommandSpec {
    name: "figma_group_nodes",
    wire_type: "group-nodes",
    description: "Group multiple nodes together",
    input: &[
        required("ids", NODE_IDS, "Array of node IDs to group"),
        optional("name", Shape::String, "Name for the group"),
    ],
};

const UNGROUP: CommandSpec = CommandSpec {
    name: "figma_ungroup",
    wire_type: "ungroup",
    description: "Ungroup a group node, moving its children to the parent",
    input: &[required("id", Shape::String, "Group node ID to ungroup")],
};

const MOVE_NODE: CommandSpec = CommandSpec {
    name: "figma_move_node",
    wire_type: "move-node",
    description: "Move a node to a new parent (reparent)",
    input: &[
        required("id", Shape::String, "Node ID to move"),
        required("parentId", Shape::String, "New parent node ID"),
        optional(
            "index",
            Shape::Number,
            "Position index within new parent children (0 = first). Appends at end if omitted.",
        ),
    ],
};

const CREATE_LINE: CommandSpec = CommandSpec {
    name: "figma_create_line",
    wire_type: "create-line",
    description: "Create a line node. Default is 100px wide with a black stroke.",
    input: &[
        optional("name", Shape::String, "Name of the line"),
        optional("x", Shape::Number, "X position"),
        optional("y", Shape::Number, "Y position"),
        optional("length", Shape::Number, "Length of the line in pixels"),
        optional("rotation", Shape::Number, "Rotation in degrees"),
        optional("strokes", PAINTS, "Stroke paints (hex strings or paint objects)"),
        optional("strokeWeight", Shape::Number, "Stroke weight in pixels"),
        optional(
            "strokeCap",
            Shape::Enum(&["NONE", "ROUND", "SQUARE", "ARROW_LINES", "ARROW_EQUILATERAL"]),
            "Stroke cap style",
        ),
        optional("dashPattern", DASH_PATTERN, "Dash pattern, e.g. [10, 5]"),
        optional("parent", Shape::String, "Parent node ID"),
    ],
};

const BOOLEAN_OPERATION: CommandSpec = CommandSpec {
    name: "figma_boolean_operation",
    wire_type: "boolean-operation",
    description: "Perform a boolean operation (union, subtract, intersect, exclude) on multiple \
                  nodes to create a combined shape.",
    input: &[
        required(
            "operation",
            Shape::Enum(&["UNION", "SUBTRACT", "INTERSECT", "EXCLUDE"]),
            "Type of boolean operation",
        ),
        required(
            "nodeIds",
            Shape::Array {
                items: &Shape::String,
                min_items: 2,
            },
            "Array of node IDs to combine (minimum 2)",
        ),
        optional("name", Shape::String, "Name for the resulting boolean operation node"),
    ],
};

const CREATE_TEXT_PATH: CommandSpec = CommandSpec {
    name: "figma_create_text_path",
    wire_type: "create-text-path",
    description: "Create text on a path by converting a vector/shape node into a text path. \
                  The original shape node is consumed and replaced by the text path node.",
    input: &[
        required(
            "nodeId",
            Shape::String,
            "ID of the vector or shape node (Rectangle, Ellipse, Polygon, Star, Line) to use as the path",
        ),
        required("characters", Shape::String, "Text content to place on the path"),
        optional(
            "startSegment",
            Shape::Number,
            "Index of the segment in the vector network to start text from (default 0)",
        ),
        optional(
            "startPosition",
            Shape::Number,
            "Position (0-1) along the start segment to begin text (default 0)",
        ),
        optional("fontSize", Shape::Number, "Font size"),
        optional("fontName", FONT_NAME, "Font family and style"),
        optional("fills", PAINTS, "Text fill colors"),
    ],
};

// =============================================================================
// Pages and sections
// =============================================================================

const CREATE_PAGE: CommandSpec = CommandSpec {
    name: "figma_create_page",
    wire_type: "create-page",
    description: "Create a new page in the document. Optionally switch to it.",
    input: &[
        optional("name", Shape::String, "Name for the new page"),
        optional(
            "switchToPage",
            Shape::Boolean,
            "Whether to switch to the new page after creation (default false)",
        ),
    ],
};

const CREATE_PAGE_DIVIDER: CommandSpec = CommandSpec {
    name: "figma_create_page_divider",
    wire_type: "create-page-divider",
    description: "Create a page divider in the pages panel. A divider visually separates pages.",
    input: &[optional(
        "name",
        Shape::String,
        "Divider name (must be all asterisks, en dashes, em dashes, or spaces). Defaults to \"---\".",
    )],
};

const CREATE_SECTION: CommandSpec = CommandSpec {
    name: "figma_create_section",
    wire_type: "create-section",
    description: "Create a section node to organize content on the canvas. Sections are visual \
                  containers that group frames and other elements.",
    input: &[
        optional("name", Shape::String, "Section name"),
        optional("x", Shape::Number, "X position"),
        optional("y", Shape::Number, "Y position"),
        optional("width", Shape::Number, "Width in pixels"),
        optional("height", Shape::Number, "Height in pixels"),
        optional("fills", PAINTS, "Background fills"),
        optional("contentsHidden", Shape::Boolean, "Whether section contents are hidden"),
    ],
};

// =============================================================================
// Variables (design tokens)
// =============================================================================

const CREATE_VARIABLE_COLLECTION: CommandSpec = CommandSpec {
    name: "figma_create_variable_collection",
    wire_type: "create-variable-collection",
    description: "Create a new variable collection (design token group). Collections organize \
                  variables and support modes (e.g., Light/Dark).",
    input: &[
        required("name", Shape::String, "Name of the collection"),
        optional(
            "initialModeRename",
            Shape::String,
            "Rename the default first mode (e.g., \"Light\")",
        ),
        optional("modes", array_of(&MODE), "Additional modes to add beyond the default"),
    ],
};

const CREATE_VARIABLE: CommandSpec = CommandSpec {
    name: "figma_create_variable",
    wire_type: "create-variable",
    description: "Create a variable (design token) inside a collection. Variables can be of \
                  type COLOR, FLOAT, STRING, or BOOLEAN.",
    input: &[
        required(
            "name",
            Shape::String,
            "Variable name (e.g., \"primary-color\", \"spacing-sm\")",
        ),
        required(
            "collectionId",
            Shape::String,
            "ID of the variable collection to add this variable to",
        ),
        required("resolvedType", VARIABLE_TYPE, "Variable type"),
        optional(
            "values",
            Shape::Record,
            "Values keyed by mode ID. For COLOR use hex strings like \"#FF0000\". For FLOAT use \
             numbers. For STRING use strings. For BOOLEAN use true/false.",
        ),
        optional("description", Shape::String, "Variable description"),
        optional(
            "scopes",
            NODE_IDS,
            "Scopes where this variable appears in the Figma variable picker",
        ),
        optional("hiddenFromPublishing", Shape::Boolean, "Hide from library publishing"),
    ],
};

const GET_LOCAL_VARIABLES: CommandSpec = CommandSpec {
    name: "figma_get_local_variables",
    wire_type: "get-local-variables",
    description: "Get all local variables in the document, optionally filtered by type.",
    input: &[optional("type", VARIABLE_TYPE, "Filter by variable type")],
};

const GET_LOCAL_VARIABLE_COLLECTIONS: CommandSpec = CommandSpec {
    name: "figma_get_local_variable_collections",
    wire_type: "get-local-variable-collections",
    description: "Get all local variable collections in the document.",
    input: &[],
};

const UPDATE_VARIABLE: CommandSpec = CommandSpec {
    name: "figma_update_variable",
    wire_type: "update-variable",
    description: "Update an existing variable (design token). Can change name, description, \
                  values (including setting variable aliases for token layering).",
    input: &[
        required(
            "variableId",
            Shape::String,
            "ID of the variable to update (e.g., \"VariableID:632:3\")",
        ),
        optional("name", Shape::String, "New variable name"),
        optional("description", Shape::String, "New variable description"),
        optional(
            "values",
            Shape::Record,
            "Values keyed by mode ID. For COLOR use hex strings like \"#FF0000\". For aliases \
             use {type: \"VARIABLE_ALIAS\", id: \"VariableID:xxx:xxx\"}",
        ),
        optional("scopes", NODE_IDS, "Scopes where this variable appears"),
        optional("hiddenFromPublishing", Shape::Boolean, "Hide from library publishing"),
    ],
};

const DELETE_VARIABLE: CommandSpec = CommandSpec {
    name: "figma_delete_variable",
    wire_type: "delete-variable",
    description: "Delete a variable (design token) from the document.",
    input: &[required(
        "variableId",
        Shape::String,
        "ID of the variable to delete (e.g., \"VariableID:632:3\")",
    )],
};

const DELETE_VARIABLE_COLLECTION: CommandSpec = CommandSpec {
    name: "figma_delete_variable_collection",
    wire_type: "delete-variable-collection",
    description: "Delete an entire variable collection and all its variables from the document.",
    input: &[required(
        "collectionId",
        Shape::String,
        "ID of the collection to delete (e.g., \"VariableCollectionId:783:32\")",
    )],
};

const RENAME_VARIABLE_COLLECTION_MODE: CommandSpec = CommandSpec {
    name: "figma_rename_variable_collection_mode",
    wire_type: "rename-variable-collection-mode",
    description: "Rename a mode in a variable collection (e.g., rename \"Mode 1\" to \"Default\").",
    input: &[
        required("collectionId", Shape::String, "ID of the variable collection"),
        required("modeId", Shape::String, "ID of the mode to rename"),
        required("newName", Shape::String, "New name for the mode"),
    ],
};

const ADD_COLLECTION_MODE: CommandSpec = CommandSpec {
    name: "figma_add_collection_mode",
    wire_type: "add-collection-mode",
    description: "Add a new mode to an existing variable collection (e.g., add \"Dark\" mode \
                  to a color collection).",
    input: &[
        required(
            "collectionId",
            Shape::String,
            "ID of the variable collection (e.g., \"VariableCollectionId:632:2\")",
        ),
        required("name", Shape::String, "Name for the new mode (e.g., \"Dark\")"),
    ],
};

const BIND_VARIABLE_TO_NODE: CommandSpec = CommandSpec {
    name: "figma_bind_variable_to_node",
    wire_type: "bind-variable-to-node",
    description: "Bind a variable to a node property (fill color, stroke color, corner radius, \
                  etc.). This creates a live link between the node property and the variable.",
    input: &[
        required("nodeId", Shape::String, "ID of the node to bind the variable to"),
        required(
            "variableId",
            Shape::String,
            "ID of the variable to bind (e.g., \"VariableID:632:3\")",
        ),
        required(
            "field",
            Shape::String,
            "Property field to bind: \"fills\", \"strokes\" for paint arrays, or scalar fields \
             like \"cornerRadius\", \"opacity\", \"width\", \"height\", \"topLeftRadius\", etc.",
        ),
        optional(
            "index",
            Shape::Number,
            "For paint arrays (fills/strokes), the index of the paint to bind (default 0)",
        ),
    ],
};

const BIND_VARIABLE_TO_STYLE: CommandSpec = CommandSpec {
    name: "figma_bind_variable_to_style",
    wire_type: "bind-variable-to-style",
    description: "Bind a variable to a text style property (fontSize, lineHeight, etc.). This \
                  creates a live link so the style responds to mode changes \
                  (e.g., Mobile/Tablet/Desktop).",
    input: &[
        required("styleId", Shape::String, "ID of the text style"),
        required("variableId", Shape::String, "ID of the variable to bind"),
        required(
            "field",
            Shape::Enum(&[
                "fontSize",
                "lineHeight",
                "letterSpacing",
                "paragraphSpacing",
                "paragraphIndent",
                "fontFamily",
                "fontStyle",
                "fontWeight",
            ]),
            "Text style property to bind",
        ),
    ],
};

// =============================================================================
// Registry
// =============================================================================

/// A command the plugin can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    GetDocumentInfo,
    GetNode,
    CreateFrame,
    CreateRectangle,
    CreateText,
    CreateEllipse,
    CreateComponent,
    ModifyNode,
    DeleteNode,
    ApplyAutoLayout,
    CreateStyle,
    GetStyle,
    ListStyles,
    UpdateStyle,
    DeleteStyle,
    ApplyStyle,
    GetNodeStyles,
    DetachStyle,
    GetSelection,
    SetSelection,
    ExportNode,
    CreateComponentSet,
    AddVariant,
    SetStrokes,
    SetEffects,
    SetTextStyle,
    CloneNode,
    GroupNodes,
    Ungroup,
    MoveNode,
    CreateLine,
    CreatePage,
    CreatePageDivider,
    CreateComponentFromNode,
    BooleanOperation,
    CreateSection,
    CreateVariableCollection,
    CreateVariable,
    GetLocalVariables,
    GetLocalVariableCollections,
    UpdateVariable,
    DeleteVariable,
    DeleteVariableCollection,
    RenameVariableCollectionMode,
    AddCollectionMode,
    BindVariableToNode,
    BindVariableToStyle,
    CreateTextPath,
}

impl Command {
    /// Every command, in the order advertised by `tools/list`.
    pub const ALL: [Self; 48] = [
        Self::GetDocumentInfo,
        Self::GetNode,
        Self::CreateFrame,
        Self::CreateRectangle,
        Self::CreateText,
        Self::CreateEllipse,
        Self::CreateComponent,
        Self::ModifyNode,
        Self::DeleteNode,
        Self::ApplyAutoLayout,
        Self::CreateStyle,
        Self::GetStyle,
        Self::ListStyles,
        Self::UpdateStyle,
        Self::DeleteStyle,
        Self::ApplyStyle,
        Self::GetNodeStyles,
        Self::DetachStyle,
        Self::GetSelection,
        Self::SetSelection,
        Self::ExportNode,
        Self::CreateComponentSet,
        Self::AddVariant,
        Self::SetStrokes,
        Self::SetEffects,
        Self::SetTextStyle,
        Self::CloneNode,
        Self::GroupNodes,
        Self::Ungroup,
        Self::MoveNode,
        Self::CreateLine,
        Self::CreatePage,
        Self::CreatePageDivider,
        Self::CreateComponentFromNode,
        Self::BooleanOperation,
        Self::CreateSection,
        Self::CreateVariableCollection,
        Self::CreateVariable,
        Self::GetLocalVariables,
        Self::GetLocalVariableCollections,
        Self::UpdateVariable,
        Self::DeleteVariable,
        Self::DeleteVariableCollection,
        Self::RenameVariableCollectionMode,
        Self::AddCollectionMode,
        Self::BindVariableToNode,
        Self::BindVariableToStyle,
        Self::CreateTextPath,
    ];

    /// Returns the static description of this command.
    #[must_use]
    pub const fn spec(self) -> &'static CommandSpec {
        match self {
            Self::GetDocumentInfo => &GET_DOCUMENT_INFO,
            Self::GetNode => &GET_NODE,
            Self::CreateFrame => &CREATE_FRAME,
            Self::CreateRectangle => &CREATE_RECTANGLE,
            Self::CreateText => &CREATE_TEXT,
            Self::CreateEllipse => &CREATE_ELLIPSE,
            Self::CreateComponent => &CREATE_COMPONENT,
            Self::ModifyNode => &MODIFY_NODE,
            Self::DeleteNode => &DELETE_NODE,
            Self::ApplyAutoLayout => &APPLY_AUTO_LAYOUT,
            Self::CreateStyle => &CREATE_STYLE,
            Self::GetStyle => &GET_STYLE,
            Self::ListStyles => &LIST_STYLES,
            Self::UpdateStyle => &UPDATE_STYLE,
            Self::DeleteStyle => &DELETE_STYLE,
            Self::ApplyStyle => &APPLY_STYLE,
            Self::GetNodeStyles => &GET_NODE_STYLES,
            Self::DetachStyle => &DETACH_STYLE,
            Self::GetSelection => &GET_SELECTION,
            Self::SetSelection => &SET_SELECTION,
            Self::ExportNode => &EXPORT_NODE,
            Self::CreateComponentSet => &CREATE_COMPONENT_SET,
            Self::AddVariant => &ADD_VARIANT,
            Self::SetStrokes => &SET_STROKES,
            Self::SetEffects => &SET_EFFECTS,
            Self::SetTextStyle => &SET_TEXT_STYLE,
            Self::CloneNode => &CLONE_NODE,
            Self::GroupNodes => &GROUP_NODES,
            Self::Ungroup => &UNGROUP,
            Self::MoveNode => &MOVE_NODE,
            Self::CreateLine => &CREATE_LINE,
            Self::CreatePage => &CREATE_PAGE,
            Self::CreatePageDivider => &CREATE_PAGE_DIVIDER,
            Self::CreateComponentFromNode => &CREATE_COMPONENT_FROM_NODE,
            Self::BooleanOperation => &BOOLEAN_OPERATION,
            Self::CreateSection => &CREATE_SECTION,
            Self::CreateVariableCollection => &CREATE_VARIABLE_COLLECTION,
            Self::CreateVariable => &CREATE_VARIABLE,
            Self::GetLocalVariables => &GET_LOCAL_VARIABLES,
            Self::GetLocalVariableCollections => &GET_LOCAL_VARIABLE_COLLECTIONS,
            Self::UpdateVariable => &UPDATE_VARIABLE,
            Self::DeleteVariable => &DELETE_VARIABLE,
            Self::DeleteVariableCollection => &DELETE_VARIABLE_COLLECTION,
            Self::RenameVariableCollectionMode => &RENAME_VARIABLE_COLLECTION_MODE,
            Self::AddCollectionMode => &ADD_COLLECTION_MODE,
            Self::BindVariableToNode => &BIND_VARIABLE_TO_NODE,
            Self::BindVariableToStyle => &BIND_VARIABLE_TO_STYLE,
            Self::CreateTextPath => &CREATE_TEXT_PATH,
        }
    }

    /// Looks up a command by tool name or wire type.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| {
            let spec = command.spec();
            spec.name == name || spec.wire_type == name
        })
    }

    /// Returns the tool name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.spec().name
    }

    /// Returns the wire command type.
    #[must_use]
    pub const fn wire_type(self) -> &'static str {
        self.spec().wire_type
    }

    /// Returns the argument shape.
    #[must_use]
    pub const fn input_shape(self) -> Shape {
        Shape::Object(self.spec().input)
    }

    /// Validates `arguments` and returns the payload to send to the plugin.
    ///
    /// Absent or `null` arguments are treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first validation failure.
    pub fn normalize(self, arguments: &Value) -> Result<Value, String> {
        let empty = Value::Object(serde_json::Map::new());
        let arguments = if arguments.is_null() { &empty } else { arguments };
        self.input_shape().normalize(arguments, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn names_and_wire_types_are_unique() {
        let names: HashSet<_> = Command::ALL.iter().map(|c| c.name()).collect();
        let wire_types: HashSet<_> = Command::ALL.iter().map(|c| c.wire_type()).collect();
        assert_eq!(names.len(), Command::ALL.len());
        assert_eq!(wire_types.len(), Command::ALL.len());
    }

    #[test]
    fn every_name_is_prefixed() {
        for command in Command::ALL {
            assert!(command.name().starts_with("figma_"), "{}", command.name());
            assert!(!command.spec().description.is_empty());
        }
    }

    #[test]
    fn lookup_by_name_and_wire_type() {
        assert_eq!(
            Command::from_name("figma_create_rectangle"),
            Some(Command::CreateRectangle)
        );
        assert_eq!(
            Command::from_name("create-rectangle"),
            Some(Command::CreateRectangle)
        );
        assert_eq!(Command::from_name("figma_ungroup"), Some(Command::Ungroup));
        assert_eq!(Command::from_name("ungroup"), Some(Command::Ungroup));
        assert_eq!(Command::from_name("figma_make_coffee"), None);
    }

    #[test]
    fn null_arguments_become_empty_object() {
        let payload = Command::GetSelection.normalize(&Value::Null).unwrap();
        assert_eq!(payload, json!({}));
    }

    #[test]
    fn create_rectangle_payload() {
        let payload = Command::CreateRectangle
            .normalize(&json!({"width": 100, "height": 50}))
            .unwrap();
        assert_eq!(payload, json!({"width": 100, "height": 50}));
    }

    #[test]
    fn boolean_operation_needs_two_nodes() {
        let err = Command::BooleanOperation
            .normalize(&json!({"operation": "UNION", "nodeIds": ["1:1"]}))
            .unwrap_err();
        assert!(err.contains("at least 2"));

        assert!(Command::BooleanOperation
            .normalize(&json!({"operation": "UNION", "nodeIds": ["1:1", "1:2"]}))
            .is_ok());
    }

    #[test]
    fn create_style_validates_nested_effects() {
        let err = Command::CreateStyle
            .normalize(&json!({
                "type": "EFFECT",
                "name": "Shadow/Soft",
                "properties": {"effects": [{"type": "DROP_SHADOW"}]}
            }))
            .unwrap_err();
        assert_eq!(err, "Missing required parameter: properties.effects[0].radius");
    }

    #[test]
    fn set_effects_accepts_full_shadow() {
        let args = json!({
            "id": "1:2",
            "effects": [{
                "type": "DROP_SHADOW",
                "color": "#000000",
                "opacity": 0.25,
                "offset": {"x": 0, "y": 4},
                "radius": 8
            }]
        });
        assert_eq!(Command::SetEffects.normalize(&args).unwrap(), args);
    }

    #[test]
    fn create_variable_values_must_be_object() {
        let err = Command::CreateVariable
            .normalize(&json!({
                "name": "primary",
                "collectionId": "VariableCollectionId:1:1",
                "resolvedType": "COLOR",
                "values": ["#FF0000"]
            }))
            .unwrap_err();
        assert!(err.contains("Expected object at 'values'"));
    }

    #[test]
    fn input_schemas_are_objects() {
        for command in Command::ALL {
            let schema = command.input_shape().to_json_schema();
            assert_eq!(schema["type"], "object", "{}", command.name());
        }
    }
}
