/// Hand-maintained set of markup tags that never carry translatable text
///
/// The list is an open-ended heuristic, not a classifier: it accumulates
/// structural, numeric and asset-reference tags as they show up in the
/// frequency report. It can be replaced or extended from a plain text file
/// (one tag per line, `#` comments) so tuning does not require a rebuild.
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Container tags skipped by every stage that walks a document, independent of
/// the configurable exclusion set.
pub const ROOT_CONTAINER_TAGS: &[&str] = &["infotexts", "style"];

/// Built-in exclusions, stored lowercase; membership checks are
/// case-insensitive.
const DEFAULT_EXCLUDED_TAGS: &[&str] = &[
    // containers and styling
    "infotexts",
    "style",
    // asset and media references
    "sound",
    "sprite",
    "animation",
    "music",
    "soundfile",
    "musicfile",
    "imagefile",
    "texture",
    "animationfile",
    "soundchannel",
    "soundvolume",
    "soundrange",
    "spritecolor",
    "decorativesprite",
    "loop",
    "playonstart",
    "filename",
    "path",
    // entity and structure definitions
    "limb",
    "trigger",
    "statvalue",
    "objective",
    "particleemitter",
    "damagemodifier",
    "attack",
    "character",
    "job",
    "item",
    "structure",
    "locationtype",
    "levelgenerationparameters",
    "mission",
    "event",
    "eventset",
    "characterinfo",
    "ragdoll",
    "campaignsettings",
    "destructible",
    "fabricator",
    "deconstructor",
    "repairable",
    "controller",
    "connectionpanel",
    "engine",
    "pump",
    "reactor",
    "turret",
    "itemcontainer",
    "door",
    "medicalclinic",
    "talenttree",
    "talents",
    "submarine",
    "shuttle",
    "upgradecategory",
    "upgrademodule",
    "afflictions",
    "geneticmaterial",
    "mapgenerationparameters",
    // placement and availability flags
    "allowwhenriding",
    "allowatsub",
    "allowatbeaconstation",
    "allowatoutpost",
    "allowatcity",
    "allowatcolonies",
    "allowatdestroyeddoutpost",
    "allowatabandonedoutpost",
    "allowatruins",
    "allowatwreck",
    "allowatcave",
    "allowatpirateoutpost",
    "commonness",
    "requiredcampaignlevel",
    "campaignonly",
    // numeric and geometric values
    "health",
    "price",
    "fabricationtime",
    "deconstructtime",
    "containable",
    "color",
    "vector2",
    "vector3",
    "vector4",
    "rect",
    "point",
    "offset",
    "scale",
    "size",
    // internal identifiers
    "limbname",
    "bonename",
    "jointname",
    "state",
    "type",
    "category",
    "group",
    "layer",
    "order",
    "slot",
    "targettag",
    "sourcetag",
    "linkedsub",
    "linkeduuid",
    "variable",
    "property",
    "value",
    "button",
    "command",
    "script",
    "function",
    "eventname",
    "dialogflag",
    "objectiveflag",
    "questflag",
    "classname",
    "speciesname",
    "itemidentifier",
    "structureidentifier",
    "characteridentifier",
    "requireditem",
    "requiredskill",
    "default",
    "author",
    "id",
    // standard verbs that never change
    "useverb",
    "examineverb",
    "pickupverb",
    // doc-comment tags leaking from script sources
    "summary",
    "returns",
    "remarks",
    "c",
    "para",
    "see",
    "code",
    "exception",
    "override",
    "typeparam.t",
    "param.il",
    "param.steamid",
    "param.appid",
    "param.name",
    "param.filename",
    "param.type",
    "param.character",
    "param.frequency",
    "param.samplerate",
    "param.action",
    "param.identifier",
    "param.interactablefor",
    "param.statname",
    "param.value",
    "param.position",
    "param.assembly",
    "param.createnetworkevent",
    "param.defult",
    "param.force",
    "param.load",
    "param.predicate",
    "param.prefab",
    "param.radius",
    // report-driven one-offs
    "ambientmccormicks",
    "locationchange.base.changeto.military",
    "eventtext.blockadealarm.breakin",
    "locationnameformat.mine",
    "loadingscreentip",
    "dialogturnoffsonar",
    "dialogcantfindanechoicsuit",
    "lua_name",
    "lua_description",
];

#[derive(Debug, Clone)]
pub struct ExclusionSet {
    tags: HashSet<String>,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self {
            tags: DEFAULT_EXCLUDED_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ExclusionSet {
    /// Empty set, mainly for tests and for fully file-driven configurations.
    pub fn empty() -> Self {
        Self {
            tags: HashSet::new(),
        }
    }

    /// Loads an exclusion file: one tag per line, blank lines and `#` comments
    /// ignored. The result replaces the built-in list.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let content = fs::read_to_string(path)?;
        Ok(Self::empty().with_tags(parse_exclusion_lines(&content)))
    }

    /// Extends the set with additional tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.tags.insert(tag.as_ref().trim().to_ascii_lowercase());
        }
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Parses exclusion-file content into tag names.
pub fn parse_exclusion_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// True when `tag` is one of the fixed container tags.
pub fn is_root_container(tag: &str) -> bool {
    ROOT_CONTAINER_TAGS
        .iter()
        .any(|t| tag.eq_ignore_ascii_case(t))
}
