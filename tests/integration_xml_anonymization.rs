//! End-to-end anonymization of XML documents

mod utils;

use ctp_anonymizer::registry::functions::normalize_name;
use ctp_anonymizer::{AnonymizerError, Document, Status};
use pretty_assertions::assert_eq;
use rstest::rstest;
use utils::{anonymizer, md5_decimal, report, run};

fn hashed_uid(root: &str, uid: &str) -> String {
    format!("{root}.{}", md5_decimal(uid)).chars().take(64).collect()
}

#[rstest]
#[case("/r/a[0] = \"x\"", "<r><a>x</a><b>2</b><a>3</a></r>")]
#[case("/r/a[1] = \"x\"", "<r><a>1</a><b>2</b><a>x</a></r>")]
#[case("/r/a[2] = \"x\"", "<r><a>1</a><b>2</b><a>3</a></r>")]
#[case("/r/a = \"x\"", "<r><a>x</a><b>2</b><a>3</a></r>")]
#[case("/r/a[*] = \"x\"", "<r><a>x</a><b>2</b><a>x</a></r>")]
#[case("/r/* = \"x\"", "<r><a>x</a><b>x</b><a>x</a></r>")]
#[case("/r/a[one] = \"x\"", "<r><a>1</a><b>2</b><a>3</a></r>")]
fn test_index_selection(#[case] script: &str, #[case] expected: &str) {
    let outcome = run(script, "<r><a>1</a><b>2</b><a>3</a></r>");
    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.xml, expected);
}

#[rstest]
#[case("/r/out = /r/e[*]/@id", "<r><e/><e id=\"7\"/><out>x</out></r>", "<r><e/><e id=\"7\"/><out>null</out></r>")]
#[case("/r/out = /r/*/n", "<r><a/><b><n>SECRET</n></b><out>x</out></r>", "<r><a/><b><n>SECRET</n></b><out>null</out></r>")]
#[case("/r/out = /r/e[*]/@id", "<r><e id=\"1\"/><e id=\"2\"/><out>x</out></r>", "<r><e id=\"1\"/><e id=\"2\"/><out>1</out></r>")]
#[case("/r/out = /r/e[1]/@id", "<r><e id=\"1\"/><e id=\"2\"/><out>x</out></r>", "<r><e id=\"1\"/><e id=\"2\"/><out>2</out></r>")]
fn test_path_reference_uses_first_matching_node(
    #[case] script: &str,
    #[case] xml: &str,
    #[case] expected: &str,
) {
    let outcome = run(script, xml);
    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.xml, expected);
}

#[test]
fn test_required_creation() {
    let outcome = run("/r/missing/@x = $require(\"v\")", "<r/>");
    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.xml, "<r><missing x=\"v\"/></r>");
}

#[test]
fn test_required_index_past_the_end_appends() {
    let outcome = run("/r/a[3] = $require(\"n\")", "<r><a>1</a></r>");
    assert_eq!(outcome.xml, "<r><a>1</a><a>n</a></r>");
}

#[test]
fn test_absent_targets_are_not_created_without_require() {
    let outcome = run("/r/missing = \"v\"\n/r/@x = \"v\"", "<r/>");
    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.xml, "<r/>");
}

#[rstest]
#[case("/r/a = $remove()", "<r k=\"1\" j=\"2\"><b>2</b><a>3</a></r>")]
#[case("/r/a[*] = $remove()", "<r k=\"1\" j=\"2\"><b>2</b></r>")]
#[case("/r/@k = $remove()", "<r j=\"2\"><a>1</a><b>2</b><a>3</a></r>")]
#[case("/r/zz = $remove()", "<r k=\"1\" j=\"2\"><a>1</a><b>2</b><a>3</a></r>")]
#[case("/r/@zz = $remove()", "<r k=\"1\" j=\"2\"><a>1</a><b>2</b><a>3</a></r>")]
fn test_remove(#[case] script: &str, #[case] expected: &str) {
    let outcome = run(script, "<r k=\"1\" j=\"2\"><a>1</a><b>2</b><a>3</a></r>");
    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.xml, expected);
}

#[test]
fn test_attribute_and_element_values_are_isolated() {
    let xml = "<r><p id=\"7\">old</p></r>";
    assert_eq!(run("/r/p/@id = \"X\"", xml).xml, "<r><p id=\"X\">old</p></r>");
    assert_eq!(run("/r/p = \"Y\"", xml).xml, "<r><p id=\"7\">Y</p></r>");
}

#[test]
fn test_setting_a_value_keeps_child_elements() {
    let outcome = run("/r/p = \"new\"", "<r><p>old<b>bold</b>tail</p></r>");
    assert_eq!(outcome.xml, "<r><p><b>bold</b>new</p></r>");
}

#[test]
fn test_hard_error_leaves_document_unchanged() {
    let xml = "<r><a>keep</a><b>1.2.3</b></r>";
    let outcome = run("/r/a = \"changed\"\n/r/b = $hashuid(\"1.2\")\n", xml);
    assert_eq!(
        outcome.status,
        Status::Quarantine(
            AnonymizerError::InsufficientArguments {
                function: "$hashuid".to_string(),
                required: 2,
                actual: 1,
            }
            .to_string()
        )
    );
    assert_eq!(outcome.xml, xml);

    let mut document = Document::parse(xml).unwrap();
    let status = anonymizer("/r/a = \"changed\"\n/r/b = $round(this, \"ten\")\n")
        .anonymize_document(&mut document);
    assert!(status.is_quarantine());
    assert_eq!(document.to_xml_string().unwrap(), xml);
}

#[test]
fn test_variable_round_trip() {
    let outcome = run(
        "$v = /r/p\n$w = $v \"-\" $v\n/r/q = $w\n/r/p/@u = $undefined",
        "<r><p u=\"1\">pv</p><q>old</q></r>",
    );
    assert_eq!(outcome.xml, "<r><p u=\"null\">pv</p><q>pv-pv</q></r>");
}

#[test]
fn test_this_is_the_value_before_replacement() {
    let outcome = run("/r/p = $hash(this)", "<r><p>OLD</p></r>");
    assert_eq!(outcome.xml, format!("<r><p>{}</p></r>", md5_decimal("OLD")));
}

#[test]
fn test_this_includes_cdata() {
    let outcome = run("/r/p = this \"!\"", "<r><p><![CDATA[abc]]></p></r>");
    assert_eq!(outcome.xml, "<r><p>abc!</p></r>");
}

#[test]
fn test_descendant_search() {
    let outcome = run("/r//n = \"d\"", "<r><x><n>1</n></x><n>2</n><m>3</m></r>");
    assert_eq!(outcome.xml, "<r><x><n>d</n></x><n>d</n><m>3</m></r>");
}

#[test]
fn test_unknown_function_quarantines() {
    let outcome = run("/r = $scramble(this)", "<r>v</r>");
    assert!(outcome.status.is_quarantine());
    assert!(outcome.status.message().contains("$scramble"));
}

#[test]
fn test_clinical_report() {
    let script = r#"# anonymize report
$site = "SITE01"
/report/@id = $hashptid($site, this, "8")
/report/patient/@mrn = $hashptid($site, this)
/report/patient/name = $hashname(this, "10", "2")
/report/patient/birth = $incrementdate(this, "10")
/report/patient/age = $round(this, "10")
/report/study/@uid = $hashuid("1.2.3", this)
/report/study/series[*]/@uid = $hashuid("1.2.3", this)
/report/study/date = $modifydate(this, "*", "1", "1")
/report/notes = $remove()
/report/deidentified = $require("YES")
"#;
    let outcome = run(script, report());
    assert_eq!(outcome.status, Status::Ok);

    let expected = format!(
        concat!(
            "<report id=\"{id}\">",
            "<patient mrn=\"{mrn}\"><name>{name}</name><birth>19700224</birth><age>050Y</age></patient>",
            "<study uid=\"{study}\"><date>20230101</date>",
            "<series uid=\"{s1}\"/><series uid=\"{s2}\"/></study>",
            "<deidentified>YES</deidentified>",
            "</report>"
        ),
        id = &md5_decimal("[SITE01]R-1")[..8],
        mrn = md5_decimal("[SITE01]12345"),
        name = &md5_decimal(&normalize_name("Doe^John^Q", Some(2)))[..10],
        study = hashed_uid("1.2.3", "1.2.840.1.7"),
        s1 = hashed_uid("1.2.3", "1.2.840.1.7.1"),
        s2 = hashed_uid("1.2.3", "1.2.840.1.7.2"),
    );
    assert_eq!(outcome.xml, expected);
}

#[test]
fn test_declaration_and_comments_survive() {
    let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- exported -->\n<r a=\"x &amp; y\">v</r>";
    let outcome = run("/r = \"w\"", xml);
    assert_eq!(
        outcome.xml,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- exported -->\n<r a=\"x &amp; y\">w</r>"
    );
}
