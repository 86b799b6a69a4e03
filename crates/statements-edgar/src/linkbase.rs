//! Calculation linkbase parsing.
//!
//! Reads `link:loc` locators and `link:calculationArc` arcs from a standalone
//! calculation linkbase or from the linkbase embedded in an extension schema.
//! Locator labels are resolved within their enclosing `link:calculationLink`.

use roxmltree::{Document, Node, ParsingOptions};
use statements_core::{CalcGraph, CalcGraphBuilder, ReconError, Result};
use std::collections::HashMap;
use tracing::trace;

/// XBRL linkbase namespace.
pub const LINKBASE_NS: &str = "http://www.xbrl.org/2003/linkbase";

/// XLink namespace.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Parses a document and returns its calculation graph.
///
/// # Errors
/// Returns [`ReconError::Xml`] if the document is not well-formed XML.
pub fn parse_calc_graph(xml: &str) -> Result<CalcGraph> {
    let mut builder = CalcGraphBuilder::new();
    add_calc_arcs(xml, &mut builder)?;
    Ok(builder.build())
}

/// Adds every calculation arc in `xml` to `builder`.
///
/// Returns the number of arcs accepted; duplicates of an already present
/// (parent, child) pair are ignored.
///
/// # Errors
/// Returns [`ReconError::Xml`] if the document is not well-formed XML.
pub fn add_calc_arcs(xml: &str, builder: &mut CalcGraphBuilder) -> Result<usize> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options).map_err(|e| ReconError::Xml(e.to_string()))?;

    let links: Vec<Node<'_, '_>> = doc
        .descendants()
        .filter(|n| n.has_tag_name((LINKBASE_NS, "calculationLink")))
        .collect();

    let mut added = 0;
    if links.is_empty() {
        added += add_link_arcs(doc.root(), builder);
    } else {
        for link in links {
            added += add_link_arcs(link, builder);
        }
    }
    Ok(added)
}

fn add_link_arcs(scope: Node<'_, '_>, builder: &mut CalcGraphBuilder) -> usize {
    let mut locators: HashMap<&str, &str> = HashMap::new();
    for loc in scope
        .descendants()
        .filter(|n| n.has_tag_name((LINKBASE_NS, "loc")))
    {
        let label = loc.attribute((XLINK_NS, "label"));
        let concept = loc
            .attribute((XLINK_NS, "href"))
            .and_then(|href| href.split_once('#'))
            .map(|(_, fragment)| fragment);
        if let (Some(label), Some(concept)) = (label, concept) {
            locators.insert(label, concept);
        }
    }

    let mut added = 0;
    for arc in scope
        .descendants()
        .filter(|n| n.has_tag_name((LINKBASE_NS, "calculationArc")))
    {
        let from = arc
            .attribute((XLINK_NS, "from"))
            .and_then(|label| locators.get(label));
        let to = arc
            .attribute((XLINK_NS, "to"))
            .and_then(|label| locators.get(label));
        let (Some(parent), Some(child)) = (from, to) else {
            trace!("Skipping calculation arc with unresolved locator");
            continue;
        };

        let weight = arc
            .attribute("weight")
            .and_then(|w| w.trim().parse::<f64>().ok())
            .unwrap_or(1.0);
        let order = arc
            .attribute("order")
            .and_then(|o| o.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        if builder.add_arc(parent, child, weight, order) {
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKBASE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:calculationLink xlink:role="http://apple.com/role/CONSOLIDATEDBALANCESHEETS" xlink:type="extended">
    <link:loc xlink:type="locator" xlink:href="https://xbrl.fasb.org/us-gaap/2024/elts/us-gaap-2024.xsd#us-gaap_Assets" xlink:label="loc_Assets"/>
    <link:loc xlink:type="locator" xlink:href="https://xbrl.fasb.org/us-gaap/2024/elts/us-gaap-2024.xsd#us-gaap_AssetsCurrent" xlink:label="loc_AssetsCurrent"/>
    <link:loc xlink:type="locator" xlink:href="https://xbrl.fasb.org/us-gaap/2024/elts/us-gaap-2024.xsd#us-gaap_AssetsNoncurrent" xlink:label="loc_AssetsNoncurrent"/>
    <link:calculationArc xlink:type="arc" xlink:arcrole="http://www.xbrl.org/2003/arcrole/summation-item" xlink:from="loc_Assets" xlink:to="loc_AssetsNoncurrent" order="2" weight="1.0"/>
    <link:calculationArc xlink:type="arc" xlink:arcrole="http://www.xbrl.org/2003/arcrole/summation-item" xlink:from="loc_Assets" xlink:to="loc_AssetsCurrent" order="1" weight="1.0"/>
  </link:calculationLink>
  <link:calculationLink xlink:role="http://apple.com/role/CONSOLIDATEDSTATEMENTSOFOPERATIONS" xlink:type="extended">
    <link:loc xlink:type="locator" xlink:href="us-gaap-2024.xsd#us-gaap_GrossProfit" xlink:label="loc_1"/>
    <link:loc xlink:type="locator" xlink:href="us-gaap-2024.xsd#us-gaap_Revenues" xlink:label="loc_2"/>
    <link:loc xlink:type="locator" xlink:href="us-gaap-2024.xsd#us-gaap_CostOfRevenue" xlink:label="loc_3"/>
    <link:calculationArc xlink:type="arc" xlink:from="loc_1" xlink:to="loc_2"/>
    <link:calculationArc xlink:type="arc" xlink:from="loc_1" xlink:to="loc_3" order="2" weight="-1"/>
    <link:calculationArc xlink:type="arc" xlink:from="loc_1" xlink:to="loc_3" order="3" weight="1"/>
  </link:calculationLink>
</link:linkbase>"#;

    #[test]
    fn test_parse_linkbase() {
        let graph = parse_calc_graph(LINKBASE).unwrap();
        assert_eq!(graph.len(), 2);

        let assets: Vec<_> = graph
            .children("us-gaap_Assets")
            .iter()
            .map(|c| c.tag.as_str())
            .collect();
        assert_eq!(assets, vec!["us-gaap_AssetsCurrent", "us-gaap_AssetsNoncurrent"]);
    }

    #[test]
    fn test_defaults_and_first_arc_wins() {
        let graph = parse_calc_graph(LINKBASE).unwrap();
        let children = graph.children("GrossProfit");
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].tag, "us-gaap_Revenues");
        assert_eq!(children[0].weight, 1.0);
        assert_eq!(children[1].tag, "us-gaap_CostOfRevenue");
        assert_eq!(children[1].weight, -1.0);
    }

    #[test]
    fn test_labels_scoped_per_link() {
        let mut builder = CalcGraphBuilder::new();
        let added = add_calc_arcs(LINKBASE, &mut builder).unwrap();
        assert_eq!(added, 4);
    }

    #[test]
    fn test_embedded_schema_arcs() {
        let schema = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <xs:annotation>
    <xs:appinfo>
      <link:linkbase>
        <link:calculationLink xlink:type="extended" xlink:role="http://acme.com/role/BalanceSheet">
          <link:loc xlink:type="locator" xlink:href="acme-20231231.xsd#acme_OtherAssetsCustom" xlink:label="a"/>
          <link:loc xlink:type="locator" xlink:href="https://xbrl.fasb.org/us-gaap/2023/elts/us-gaap-2023.xsd#us-gaap_AssetsCurrent" xlink:label="b"/>
          <link:calculationArc xlink:type="arc" xlink:from="b" xlink:to="a" weight="1" order="4"/>
        </link:calculationLink>
      </link:linkbase>
    </xs:appinfo>
  </xs:annotation>
</xs:schema>"#;
        let graph = parse_calc_graph(schema).unwrap();
        assert!(graph.is_parent("AssetsCurrent"));
        assert_eq!(graph.children("AssetsCurrent")[0].tag, "acme_OtherAssetsCustom");
    }

    #[test]
    fn test_schema_without_arcs_is_empty() {
        let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element name="x"/></xs:schema>"#;
        assert!(parse_calc_graph(schema).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_calc_graph("<link:linkbase").unwrap_err();
        assert!(matches!(err, ReconError::Xml(_)));
    }
}
