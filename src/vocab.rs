//! Fixed ontology vocabulary.
//!
//! All predicate and class IRIs the pipeline reads or writes. These are contract
//! constants shared with the provenance producer and the astroquery annotator,
//! not configuration.

/// `http://www.w3.org/1999/02/22-rdf-syntax-ns#`
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// `http://www.w3.org/2000/01/rdf-schema#`
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
/// `http://www.w3.org/2001/XMLSchema#`
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
/// `http://schema.org/`
pub const SCHEMA_NS: &str = "http://schema.org/";
/// `http://www.w3.org/ns/prov#`
pub const PROV_NS: &str = "http://www.w3.org/ns/prov#";
/// `http://www.w3.org/ns/oa#`
pub const OA_NS: &str = "http://www.w3.org/ns/oa#";
/// Renku project ontology.
pub const RENKU_NS: &str = "https://swissdatasciencecenter.github.io/renku-ontology#";
/// ODA ontology (astroquery requests).
pub const ODA_NS: &str = "http://odahub.io/ontology#";
/// ODA ontology, https variant used for module/object name predicates.
pub const ODAS_NS: &str = "https://odahub.io/ontology#";
/// `http://purl.org/dc/terms/`
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
/// `http://purl.org/dc/elements/1.1/`
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
/// `http://xmlns.com/foaf/0.1/`
pub const FOAF_NS: &str = "http://xmlns.com/foaf/0.1/";
/// `http://www.w3.org/2006/vcard/ns#`
pub const VCARD_NS: &str = "http://www.w3.org/2006/vcard/ns#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

pub const SCHEMA_ACTION: &str = "http://schema.org/Action";
pub const SCHEMA_DEFAULT_VALUE: &str = "http://schema.org/defaultValue";

pub const PROV_STARTED_AT_TIME: &str = "http://www.w3.org/ns/prov#startedAtTime";
pub const PROV_QUALIFIED_ASSOCIATION: &str = "http://www.w3.org/ns/prov#qualifiedAssociation";
pub const PROV_HAD_PLAN: &str = "http://www.w3.org/ns/prov#hadPlan";

pub const OA_HAS_BODY: &str = "http://www.w3.org/ns/oa#hasBody";
pub const OA_HAS_TARGET: &str = "http://www.w3.org/ns/oa#hasTarget";

pub const RENKU_COMMAND: &str = "https://swissdatasciencecenter.github.io/renku-ontology#command";
pub const RENKU_HAS_ARGUMENTS: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#hasArguments";
pub const RENKU_HAS_INPUTS: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#hasInputs";
pub const RENKU_HAS_OUTPUTS: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#hasOutputs";
pub const RENKU_POSITION: &str = "https://swissdatasciencecenter.github.io/renku-ontology#position";
pub const RENKU_PARAMETER: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#parameter";
pub const RENKU_IS_ARGUMENT_OF: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#isArgumentOf";
pub const RENKU_IS_INPUT_OF: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#isInputOf";
pub const RENKU_COMMAND_INPUT: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#CommandInput";
pub const RENKU_COMMAND_OUTPUT: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#CommandOutput";
pub const RENKU_COMMAND_PARAMETER: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#CommandParameter";
pub const RENKU_COMMAND_OUTPUT_IMAGE: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#CommandOutputImage";
pub const RENKU_COMMAND_OUTPUT_FITS_FILE: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#CommandOutputFitsFile";
pub const RENKU_COMMAND_OUTPUT_NOTEBOOK: &str =
    "https://swissdatasciencecenter.github.io/renku-ontology#CommandOutputNotebook";

pub const ODA_IS_USING: &str = "http://odahub.io/ontology#isUsing";
pub const ODA_IS_REQUESTING_ASTRO_OBJECT: &str = "http://odahub.io/ontology#isRequestingAstroObject";
pub const ODA_IS_REQUESTING_ASTRO_REGION: &str = "http://odahub.io/ontology#isRequestingAstroRegion";
pub const ODA_IS_REQUESTING_ASTRO_IMAGE: &str = "http://odahub.io/ontology#isRequestingAstroImage";
pub const ODA_IS_USED_DURING: &str = "http://odahub.io/ontology#isUsedDuring";
pub const ODA_REQUESTS_ASTRO_OBJECT: &str = "http://odahub.io/ontology#requestsAstroObject";
pub const ODA_REQUESTS_ASTRO_REGION: &str = "http://odahub.io/ontology#requestsAstroRegion";
pub const ODA_REQUESTS_ASTRO_IMAGE: &str = "http://odahub.io/ontology#requestsAstroImage";
pub const ODA_IS_USING_SKY_COORDINATES: &str = "http://odahub.io/ontology#isUsingSkyCoordinates";
pub const ODA_IS_USING_RADIUS: &str = "http://odahub.io/ontology#isUsingRadius";
pub const ODA_IS_USING_COORDINATES: &str = "http://odahub.io/ontology#isUsingCoordinates";
pub const ODA_IS_USING_POSITION: &str = "http://odahub.io/ontology#isUsingPosition";
pub const ODA_IS_USING_PIXELS: &str = "http://odahub.io/ontology#isUsingPixels";
pub const ODA_IS_USING_IMAGE_BAND: &str = "http://odahub.io/ontology#isUsingImageBand";

pub const ODAS_AQ_MODULE: &str = "https://odahub.io/ontology#AQModule";
pub const ODAS_ASTRO_OBJECT: &str = "https://odahub.io/ontology#AstroObject";

pub const DCTERMS_TITLE: &str = "http://purl.org/dc/terms/title";

/// Predicates consulted, in priority order, when resolving a node's display label.
pub const LABEL_PROPERTIES: [&str; 5] = [
    RDFS_LABEL,
    "http://purl.org/dc/elements/1.1/title",
    "http://xmlns.com/foaf/0.1/name",
    "http://www.w3.org/2006/vcard/ns#fn",
    "http://www.w3.org/2006/vcard/ns#org",
];

/// Prefix bindings every graph starts with.
pub const DEFAULT_PREFIXES: [(&str, &str); 11] = [
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
    ("schema", SCHEMA_NS),
    ("prov", PROV_NS),
    ("oa", OA_NS),
    ("renku", RENKU_NS),
    ("oda", ODA_NS),
    ("odas", ODAS_NS),
    ("dcterms", DCTERMS_NS),
    ("dc", DC_NS),
];

/// Base IRI for parameter nodes minted for blank-node actions.
pub const PARAMETER_BASE: &str = "https://renkulab.io/parameters/";
