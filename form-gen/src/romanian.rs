//! Romanian: the MULTEXT-East tag inventory, the periphrastic verb grammar,
//! and the lexicon filters for irregular auxiliary forms.

use crate::error::Result;
use crate::generator::FilterSet;
use crate::grammar::{Atom, Grammar, Rule, Token};
use crate::lexicon::LexiconEntry;
use crate::msd::{MorphClass, MorphFeature, TagDictionary, TagNormalization};
use crate::{Features, LEMMA};

const YES_NO: &[(char, &str)] = &[('n', "No"), ('y', "Yes")];

pub const FUTURE: &str = "Future";
pub const PAST_PERFECT: &str = "PastPerfect";
pub const CONDITIONAL: &str = "Conditional";
pub const FUTURE_PERFECT: &str = "FuturePerfect";
pub const CONDITIONAL_PERFECT: &str = "ConditionalPerfect";
pub const SUBJUNCTIVE: &str = "Subjunctive";

pub fn tag_dictionary() -> Result<TagDictionary> {
    let person = MorphFeature::new("Person", &[('1', "1"), ('2', "2"), ('3', "3")], '3')?;
    let number = MorphFeature::new("Number", &[('s', "Sing"), ('p', "Plur")], 's')?;
    let gender = MorphFeature::new("Gender", &[('m', "Masc"), ('f', "Fem"), ('n', "Neutr")], 'm')?;
    let definite = MorphFeature::new("Definiteness", YES_NO, 'n')?;
    let case2 = MorphFeature::new("Case", &[('v', "Voc"), ('r', "Dir"), ('o', "Obl")], 'r')?;
    let case4 = MorphFeature::new(
        "Case",
        &[('v', "Voc"), ('n', "Nom"), ('g', "Gen"), ('d', "Dat"), ('a', "Acc")],
        'n',
    )?;
    let case_all = case2.merged_with(&case4, 'r')?;
    let degree = MorphFeature::new("Degree", &[('p', "Pos"), ('c', "Cmp"), ('s', "Sup")], 'p')?;
    let clitic = MorphFeature::new("Clitic", YES_NO, 'n')?.omitting_default();
    let owner_number = MorphFeature::new("Owner_Number", &[('s', "Sing"), ('p', "Plur")], 's')?;

    let verbs = MorphClass::new(
        'V',
        vec![
            Some(MorphFeature::new(
                "Type",
                &[('m', "Main"), ('a', "Aux"), ('o', "Modal"), ('c', "Copula")],
                'm',
            )?),
            Some(MorphFeature::new(
                "Mood",
                &[
                    ('i', "Ind"),
                    ('s', "Sub"),
                    ('m', "Imp"),
                    ('n', "Inf"),
                    ('p', "Part"),
                    ('g', "Ger"),
                ],
                'n',
            )?),
            Some(MorphFeature::new(
                "Tense",
                &[('p', "Pres"), ('i', "Imp"), ('s', "Past"), ('l', "Pqp")],
                'p',
            )?),
            Some(person.clone()),
            Some(number.clone()),
            Some(gender.clone()),
            Some(clitic.clone()),
        ],
    );

    let adjectives = MorphClass::new(
        'A',
        vec![
            Some(MorphFeature::new("Type", &[('f', "qualificative")], 'f')?),
            Some(degree),
            Some(gender.clone()),
            Some(number.clone()),
            Some(case_all.clone()),
            Some(definite.clone()),
            Some(clitic.clone()),
        ],
    );

    let nouns = MorphClass::new(
        'N',
        vec![
            Some(MorphFeature::new("Type", &[('c', "Common"), ('p', "Proper")], 'c')?),
            Some(gender.clone()),
            Some(number.clone()),
            Some(case2.clone()),
            Some(definite.clone()),
            Some(clitic.clone()),
        ],
    );

    let particles = MorphClass::new(
        'Q',
        vec![
            Some(MorphFeature::new(
                "Type",
                &[('z', "Neg"), ('n', "Inf"), ('s', "Sub"), ('a', "Aspect"), ('f', "Fut")],
                'z',
            )?),
            Some(clitic.clone()),
        ],
    );

    let numerals = MorphClass::new(
        'M',
        vec![
            Some(MorphFeature::new(
                "Type",
                &[
                    ('c', "Cardinal"),
                    ('o', "Ordinal"),
                    ('f', "Fractal"),
                    ('m', "Multiple"),
                    ('l', "Collect"),
                ],
                'c',
            )?),
            Some(gender.clone()),
            Some(number.clone()),
            Some(case2.clone()),
            Some(MorphFeature::new(
                "Form",
                &[('d', "Digit"), ('r', "Roman"), ('l', "Letter"), ('b', "Both")],
                'l',
            )?),
            Some(definite),
            Some(clitic.clone()),
        ],
    );

    let determiners = MorphClass::new(
        'D',
        vec![
            Some(MorphFeature::new(
                "Type",
                &[
                    ('d', "Dem"),
                    ('i', "Indef"),
                    ('s', "Poss"),
                    ('w', "Rel"),
                    ('z', "NEg"),
                    ('h', "Emph"),
                ],
                'i',
            )?),
            Some(person.clone()),
            Some(gender.clone()),
            Some(number.clone()),
            Some(case2.clone()),
            Some(owner_number.clone()),
            Some(clitic.clone()),
            Some(MorphFeature::new(
                "Modific_Type",
                &[('e', "Prenom"), ('o', "Postnom")],
                'e',
            )?),
        ],
    );

    let articles = MorphClass::new(
        'T',
        vec![
            Some(MorphFeature::new(
                "Type",
                &[('f', "Def"), ('i', "Indef"), ('s', "Poss"), ('d', "Dem")],
                'i',
            )?),
            Some(gender.clone()),
            Some(number.clone()),
            Some(case2),
            Some(clitic.clone()),
        ],
    );

    // positions 7 and 9-13 carry no information in the corpora we read
    let pronouns = MorphClass::new(
        'P',
        vec![
            Some(MorphFeature::new(
                "Type",
                &[
                    ('p', "personal"),
                    ('d', "demonstrative"),
                    ('i', "indefinite"),
                    ('s', "possessive"),
                    ('x', "reflexive"),
                    ('z', "negative"),
                    ('w', "int-rel"),
                ],
                'p',
            )?),
            Some(person),
            Some(gender),
            Some(number),
            Some(case_all),
            Some(owner_number),
            None,
            Some(clitic),
            None,
            None,
            None,
            None,
            None,
            Some(MorphFeature::new(
                "Pronoun_Form",
                &[('s', "Strong"), ('w', "Weak")],
                's',
            )?),
        ],
    );

    Ok(TagDictionary::new([
        adjectives,
        nouns,
        verbs,
        particles,
        numerals,
        determiners,
        articles,
        pronouns,
    ]))
}

/// Compound verb forms: auxiliary (and particle) sequences followed by the main verb.
pub fn verb_grammar(dictionary: &TagDictionary) -> Result<Grammar> {
    let from_tag = |tag: &str| -> Result<Features> { dictionary.features_from_tag(tag, None) };
    let word = |tag: &str| -> Result<Token> { Ok(Token::new().with_features(&from_tag(tag)?)) };

    let participle = word("Vmp--sm")?.agree(LEMMA);
    let infinitive = word("Vmn")?.agree(LEMMA);
    let auxiliary = word("Va")?.agree("Person").agree("Number");
    let auxiliary_infinitive = word("Van")?;
    let sa = word("Qs")?.with(LEMMA, "să");

    let agreeing = Token::new().agree("Person").agree("Number").agree(LEMMA);

    let past_perfect = Rule::new(
        Atom::new(PAST_PERFECT, agreeing.clone()),
        vec![
            Atom::new(
                "Aux",
                auxiliary.clone().with(LEMMA, "avea").with("Special", "Ind"),
            ),
            Atom::new("Participle", participle.clone()),
        ],
    );
    let future = Rule::new(
        Atom::new(FUTURE, agreeing.clone()),
        vec![
            Atom::new("Aux", auxiliary.clone().with(LEMMA, "vrea")),
            Atom::new("Infinitive", infinitive.clone()),
        ],
    );
    let future_perfect = Rule::new(
        Atom::new(FUTURE_PERFECT, agreeing.clone()),
        vec![
            Atom::new("Aux", auxiliary.clone().with(LEMMA, "vrea")),
            Atom::new("Fi", auxiliary_infinitive.clone().with(LEMMA, "fi")),
            Atom::new("Participle", participle.clone()),
        ],
    );
    let conditional = Rule::new(
        Atom::new(CONDITIONAL, agreeing.clone()),
        vec![
            Atom::new("Aux", auxiliary.clone().with(LEMMA, "avea")),
            Atom::new("Infinitive", infinitive),
        ],
    );
    let conditional_perfect = Rule::new(
        Atom::new(CONDITIONAL_PERFECT, agreeing),
        vec![
            Atom::new("Aux", auxiliary.with(LEMMA, "avea")),
            Atom::new("Fi", auxiliary_infinitive.with(LEMMA, "fi")),
            Atom::new("Participle", participle),
        ],
    );
    let subjunctive_12 = Rule::new(
        Atom::new(
            SUBJUNCTIVE,
            Token::new()
                .with_any_of("Person", &["1", "2"])
                .agree("Number")
                .agree(LEMMA),
        ),
        vec![
            Atom::new("SA", sa.clone()),
            Atom::new(
                "Subj12",
                word("Vmip")?.agree("Person").agree("Number").agree(LEMMA),
            ),
        ],
    );
    let subjunctive_3 = Rule::new(
        Atom::new(
            SUBJUNCTIVE,
            Token::new().with("Person", "3").agree("Number").agree(LEMMA),
        ),
        vec![
            Atom::new("SA", sa),
            Atom::new(
                "Subj3",
                word("Vmsp")?.agree("Person").agree("Number").agree(LEMMA),
            ),
        ],
    );

    Ok(Grammar::new([
        future,
        past_perfect,
        conditional,
        future_perfect,
        conditional_perfect,
        subjunctive_12,
        subjunctive_3,
    ]))
}

/// Reject forms carrying the negative prefix unless the lemma itself is negative.
pub fn reject_negated(entry: &LexiconEntry, _query_tag: &str) -> bool {
    !entry.is_negated()
}

/// Conditional: aș/*am, ai, ar/*a, am, ați, ar/*au
pub fn conditional_auxiliary(entry: &LexiconEntry, query_tag: &str) -> bool {
    if !reject_negated(entry, query_tag) {
        return false;
    }
    if entry.tag().starts_with("Va") && entry.lemma() == "avea" {
        let form = entry.form();
        if form == "a" || form == "au" || (form == "am" && query_tag.starts_with("Va--1s")) {
            return false;
        }
    }
    true
}

/// Past perfect: am/*aș, ai, a/*ar, am, ați, au/*ar
pub fn past_perfect_auxiliary(entry: &LexiconEntry, query_tag: &str) -> bool {
    if !reject_negated(entry, query_tag) {
        return false;
    }
    !(entry.tag().starts_with("Va")
        && entry.lemma() == "avea"
        && matches!(entry.form(), "aș" | "ar"))
}

pub fn filter_set() -> FilterSet {
    FilterSet::new()
        .with_default(reject_negated)
        .with_category(CONDITIONAL, conditional_auxiliary)
        .with_category(CONDITIONAL_PERFECT, conditional_auxiliary)
        .with_category(PAST_PERFECT, past_perfect_auxiliary)
}

/// Known malformed tags in the RoRefTrees treebank and their corrections.
pub fn reference_tag_normalization() -> TagNormalization {
    [
        ("Vmg-------y", "Vmg----y"),
        ("Qz-y", "Qzy"),
        ("Va--3s----y", "Va--3s-y"),
        ("Qs-y", "Qsy"),
        ("Va--3-----y", "Va--3--y"),
        ("Vmip1s----y", "Vmip1s-y"),
        ("Va--3p----y", "Va--3p-y"),
        ("Vaip3s----y", "Vaip3s-y"),
        ("Vmii3p----y", "Vmii3p-y"),
        ("Vmsp3-----y", "Vmsp3--y"),
        ("Vmii1-----y", "Vmii1--y"),
        ("Vmip3-----y", "Vmip3--y"),
        ("Vmm-2s----y", "Vmm-2s-y"),
        ("Vmip3s----y", "Vmip3s-y"),
        ("Qn-y", "Qny"),
        ("Ds3msrs-y", "Ds3msrsy"),
        ("Vag-------y", "Vag----y"),
        ("Ncmrn", "Ncmprn"),
        ("Vmip2s----y", "Vmip2s-y"),
        ("Di3-----y", "Di3----y"),
        ("Dd3fpr--y", "Dd3fpr-y"),
        ("Vaip3p----y", "Vaip3p-y"),
        ("Va--2p----y", "Va--2p-y"),
        ("Ds1msrs-y", "Ds1msrsy"),
        ("Vmnp------y", "Vmnp---y"),
        ("Va--2s----y", "Va--2s-y"),
        ("Ds1fsrs-y", "Ds1fsrsy"),
        ("Vmp--sm---y", "Vmp--smy"),
        ("Di3-sr--y", "Di3-sr-y"),
        ("Va--1s----y", "Va--1s-y"),
        ("Vmip1p----y", "Vmip1p-y"),
        ("Va--1-----y", "Va--1--y"),
        ("Vmis3s----y", "Vmis3s-y"),
        ("Vmil3s----y", "Vmil3s-y"),
        ("Vmis3p----y", "Vmis3p-y"),
        ("Vmil3p----y", "Vmil3p-y"),
        ("Vmii3s----y", "Vmii3s-y"),
    ]
    .into_iter()
    .collect()
}
