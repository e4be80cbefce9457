use form_gen::conjugate::{self, Number, Person, VerbTense};
use form_gen::conllu::{self, Sentence};
use form_gen::lexicon::NegationHeuristic;
use form_gen::{EngineConfig, Lexicon, MorphEngine, MorphError, TreeNode};

const LEXICON: &str = "\
am\tavea\tVa--1s
aș\tavea\tVa--1s
a\tavea\tVa--3s
ar\tavea\tVa--3s
voi\tvrea\tVa--1s
va\tvrea\tVa--3s
fi\t=\tVan
mâncat\tmânca\tVmp--sm
nemâncat\tmânca\tVmp--sm
mânca\t=\tVmn
mănânc\tmânca\tVmip1s
mere\tmăr\tNcfp-n
să\t=\tQs
cânt\tcânta\tVmip1s
cânte\tcânta\tVmsp3
cânta\t=\tVmnp
";

const TREEBANK: &str = "\
# sent_id = 1
# text = Am mâncat mere.
1\tAm\tavea\tAUX\tVa--1s\tMood=Ind|Number=Sing|Person=1\t2\taux\t_\t_
2\tmâncat\tmânca\tVERB\tVmp--sm\tGender=Masc|Number=Sing|VerbForm=Part\t0\troot\t_\t_
3\tmere\tmăr\tNOUN\tNcfp-n\tGender=Fem|Number=Plur\t2\tobj\t_\t_
4\t.\t.\tPUNCT\tPERIOD\t_\t2\tpunct\t_\t_

# sent_id = 2
# text = Să cânte.
1\tSă\tsă\tPART\tQs\t_\t2\tmark\t_\t_
2\tcânte\tcânta\tVERB\tVmsp3\tMood=Sub|Person=3\t0\troot\t_\t_
3\t.\t.\tPUNCT\tPERIOD\t_\t2\tpunct\t_\t_

# sent_id = 3
# text = Voi cânta.
1\tVoi\tvrea\tAUX\tVa--1s\t_\t2\taux\t_\t_
2\tcânta\tcânta\tVERB\tVmnp\tVerbForm=Inf\t0\troot\t_\t_
3\t.\t.\tPUNCT\tPERIOD\t_\t2\tpunct\t_\t_

# sent_id = 4
# text = Cânt.
1\tCânt\tcânta\tVERB\tVmip1s\t_\t0\troot\t_\t_
2\t.\t.\tPUNCT\tPERIOD\t_\t1\tpunct\t_\t_
";

fn engine() -> MorphEngine {
    let lexicon = Lexicon::read_tsv(LEXICON.as_bytes(), &NegationHeuristic::default()).unwrap();
    MorphEngine::romanian(lexicon, EngineConfig::default()).unwrap()
}

fn observed_forms(sentence: &Sentence, uids: &[String]) -> String {
    uids.iter()
        .map(|uid| {
            let id = uid.rsplit('/').next().unwrap().parse().unwrap();
            sentence.node(id).unwrap().form().to_lowercase()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn extracted_features_regenerate_the_observed_words() {
    let engine = engine();
    let sentences = conllu::parse_document(TREEBANK).unwrap();
    assert_eq!(sentences.len(), 4);

    let mut checked = Vec::new();
    for sentence in &sentences {
        for node in sentence.nodes() {
            if !matches!(node.upos(), "VERB" | "NOUN") {
                continue;
            }
            let (features, uids) = engine.extract(&node).unwrap();
            let regenerated = engine.generate_best_form(&features).unwrap().join(" ");
            assert_eq!(regenerated, observed_forms(sentence, &uids), "{}", node.uid());
            checked.push(regenerated);
        }
    }
    assert_eq!(checked, ["am mâncat", "mere", "să cânte", "voi cânta", "cânt"]);
}

#[test]
fn compound_extraction_reports_every_participating_node() {
    let engine = engine();
    let sentences = conllu::parse_document(TREEBANK).unwrap();
    let (features, uids) = engine.extract(&sentences[1].node(2).unwrap()).unwrap();
    assert_eq!(features["SynthForm"], "Subjunctive");
    assert_eq!(features["Person"], "3");
    assert_eq!(uids, ["2/1", "2/2"]);
}

#[test]
fn conjugation_shortcuts() {
    let engine = engine();
    let forms = |tense, person, number| {
        conjugate::indicative_forms(&engine, "mânca", tense, person, number).unwrap()
    };
    assert_eq!(
        forms(VerbTense::PastPerfect, Person::First, Number::Singular),
        ["am", "mâncat"]
    );
    assert_eq!(
        forms(VerbTense::PastPerfect, Person::Third, Number::Singular),
        ["a", "mâncat"]
    );
    assert_eq!(
        forms(VerbTense::Future, Person::Third, Number::Singular),
        ["va", "mânca"]
    );
    assert_eq!(
        forms(VerbTense::Present, Person::First, Number::Singular),
        ["mănânc"]
    );
}

#[test]
fn missing_participle_fails_the_whole_form() {
    let engine = engine();
    let err = conjugate::indicative_forms(
        &engine,
        "cânta",
        VerbTense::PastPerfect,
        Person::First,
        Number::Singular,
    )
    .unwrap_err();
    match err {
        MorphError::PartialPeriphrasticFailure {
            category,
            position,
            source,
        } => {
            assert_eq!(category, "PastPerfect");
            assert_eq!(position, 1);
            assert!(matches!(*source, MorphError::NoMatchingInflection { .. }));
        }
        other => panic!("expected partial failure, got {other:?}"),
    }
}

#[test]
fn confirmed_forms_rank_first() {
    let engine = engine();
    let request = conjugate::indicative_features(
        "mânca",
        VerbTense::PastPerfect,
        Person::First,
        Number::Singular,
    );
    let candidates = engine.generate_form(&request).unwrap();
    assert_eq!(candidates[1], ["mâncat"]);

    // the negated homograph stays filtered however often it is used
    assert!(engine.confirm("nemâncat", Some("mânca"), None));
    assert_eq!(engine.generate_best_form(&request).unwrap(), ["am", "mâncat"]);
}
