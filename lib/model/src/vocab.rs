//! Namespaces and terms used by the transform pipeline.

pub use oxrdf::vocab::{rdf, rdfs, xsd};

/// The repository namespaces, as `(prefix, namespace)` pairs in resolution order.
pub const REPOSITORY_NAMESPACES: &[(&str, &str)] = &[
    ("fedora", fedora::NAMESPACE),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("dc", dc::NAMESPACE),
    ("dcterms", dcterms::NAMESPACE),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("ldp", ldp::NAMESPACE),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("premis", "http://www.loc.gov/premis/rdf/v1#"),
    ("ebucore", "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#"),
    ("pcdm", "http://pcdm.org/models#"),
];

pub mod fedora {
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://fedora.info/definitions/v4/repository#";

    /// The base type of every repository resource.
    pub const RESOURCE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://fedora.info/definitions/v4/repository#Resource");
    pub const CONTAINER: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://fedora.info/definitions/v4/repository#Container");
    pub const CREATED: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://fedora.info/definitions/v4/repository#created");
    pub const LAST_MODIFIED: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://fedora.info/definitions/v4/repository#lastModified");
    pub const HAS_PARENT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://fedora.info/definitions/v4/repository#hasParent");
}

pub mod dc {
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

    pub const TITLE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/title");
    pub const CONTRIBUTOR: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/contributor");
    pub const CREATOR: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/creator");
    pub const DESCRIPTION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/description");
    pub const SUBJECT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/subject");
}

pub mod dcterms {
    pub const NAMESPACE: &str = "http://purl.org/dc/terms/";
}

pub mod ldp {
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://www.w3.org/ns/ldp#";

    pub const CONTAINS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#contains");
}

/// The namespace of the path-query function library.
pub mod ldpath_fn {
    pub const NAMESPACE: &str = "http://www.newmedialab.at/lmf/functions/1.0/";
}
