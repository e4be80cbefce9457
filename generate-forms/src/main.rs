use anyhow::{Context, anyhow, bail};
use form_gen::conjugate::{self, FeatureValue, VerbTense};
use form_gen::{EngineConfig, Features, LEMMA, Lexicon, MorphEngine, PartOfSpeech, TreeNode, conllu};
use itertools::Itertools;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "FORM_GEN_CONFIG";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(take_config_flag(&mut args)?)?;

    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "convert" => {
            let [_, tsv, json] = &args[..] else {
                eprintln!("Usage: generate-forms convert <lexicon.tsv> <lexicon.json>");
                return Err(anyhow!("Wrong arguments for 'convert' command"));
            };
            let lexicon = Lexicon::load_tsv(tsv, &config.negation)
                .with_context(|| format!("Failed to read lexicon {tsv}"))?;
            lexicon
                .save_json(json)
                .with_context(|| format!("Failed to write lexicon {json}"))?;
            println!("Converted {} entries", lexicon.len());
        }
        "generate" => {
            if args.len() < 4 {
                eprintln!("Usage: generate-forms generate <lexicon> <lemma> <Feature=Value>...");
                eprintln!("Example: generate-forms generate lex.json mânca category=V Type=Main Mood=Ind Person=1 Number=Sing SynthForm=PastPerfect");
                return Err(anyhow!("Missing arguments for 'generate' command"));
            }
            let engine = load_engine(&args[1], config)?;
            let mut features = parse_features(&args[3..])?;
            features.insert(LEMMA.to_string(), args[2].clone());

            let candidates = engine
                .generate_form(&features)
                .with_context(|| format!("Failed to generate {}", describe(&features)))?;
            for (position, forms) in candidates.iter().enumerate() {
                println!("{position}: {}", forms.iter().join(", "));
            }
            println!(
                "{}",
                candidates.iter().filter_map(|forms| forms.first()).join(" ")
            );
        }
        "conjugate" => {
            let [_, lexicon, lemma, tense] = &args[..] else {
                eprintln!("Usage: generate-forms conjugate <lexicon> <lemma> <tense>");
                eprintln!("Tenses: {}", VerbTense::all().iter().join(", "));
                return Err(anyhow!("Wrong arguments for 'conjugate' command"));
            };
            let tense: VerbTense = tense.parse()?;
            let engine = load_engine(lexicon, config)?;
            let paradigm = conjugate::indicative_paradigm(&engine, lemma, tense)
                .with_context(|| format!("Failed to conjugate {lemma} in {tense}"))?;
            for (person, number, forms) in paradigm {
                println!("{person} {number}: {}", forms.join(" "));
            }
        }
        "extract" => {
            let [_, lexicon, treebank] = &args[..] else {
                eprintln!("Usage: generate-forms extract <lexicon> <file.conllu>");
                return Err(anyhow!("Wrong arguments for 'extract' command"));
            };
            let engine = load_engine(lexicon, config)?;
            let text = std::fs::read_to_string(treebank)
                .with_context(|| format!("Failed to read {treebank}"))?;
            let sentences = conllu::parse_document(&text)
                .with_context(|| format!("Failed to parse {treebank}"))?;
            extract(&engine, &sentences);
        }
        "confirm" => {
            let Some(ConfirmArgs {
                path,
                form,
                lemma,
                tag,
            }) = confirm_args(&args)
            else {
                eprintln!("Usage: generate-forms confirm <lexicon.json> <form> [lemma] [tag]");
                return Err(anyhow!("Wrong arguments for 'confirm' command"));
            };

            let engine = load_engine(path, config)?;
            if !engine.confirm(form, lemma, tag) {
                bail!("No lexicon entry matches {form}");
            }
            engine
                .lexicon()
                .read()
                .save_json(path)
                .with_context(|| format!("Failed to write lexicon {path}"))?;
        }
        _ => {
            print_usage();
            return Err(anyhow!("Unknown command '{command}'"));
        }
    }

    Ok(())
}

/// Report every verb, noun and adjective with the form regenerated from its features.
fn extract(engine: &MorphEngine, sentences: &[conllu::Sentence]) {
    let mut total = 0;
    let mut mismatches = 0;
    for sentence in sentences {
        for node in sentence.nodes() {
            let Some(pos) = PartOfSpeech::from_upos(node.upos()) else {
                continue;
            };
            if !matches!(pos, PartOfSpeech::Verb | PartOfSpeech::Noun | PartOfSpeech::Adj) {
                continue;
            }
            let (features, uids) = match engine.extract(&node) {
                Ok(found) => found,
                Err(e) => {
                    log::warn!("Skipping {pos} {} ({}): {e}", node.uid(), node.form());
                    continue;
                }
            };
            total += 1;

            let observed = uids
                .iter()
                .filter_map(|uid| uid.rsplit('/').next()?.parse().ok())
                .filter_map(|id| sentence.node(id))
                .map(|n| n.form().to_lowercase())
                .join(" ");
            let regenerated = match engine.generate_best_form(&features) {
                Ok(forms) => forms.join(" ").to_lowercase(),
                Err(e) => {
                    log::warn!("Could not regenerate {}: {e}", node.uid());
                    String::new()
                }
            };
            let status = if regenerated == observed {
                "ok"
            } else {
                mismatches += 1;
                "MISMATCH"
            };
            println!(
                "{}\t{observed}\t{}\t{}\t{regenerated}\t{status}",
                node.uid(),
                describe(&features),
                uids.join(",")
            );
        }
    }
    println!("{total} forms, {mismatches} mismatches");
}

struct ConfirmArgs<'a> {
    path: &'a str,
    form: &'a str,
    lemma: Option<&'a str>,
    tag: Option<&'a str>,
}

/// `confirm <lexicon.json> <form> [lemma] [tag]`
fn confirm_args(args: &[String]) -> Option<ConfirmArgs<'_>> {
    match args {
        [_, path, form, rest @ ..] if rest.len() <= 2 => Some(ConfirmArgs {
            path: path.as_str(),
            form: form.as_str(),
            lemma: rest.first().map(String::as_str),
            tag: rest.get(1).map(String::as_str),
        }),
        _ => None,
    }
}

fn describe(features: &Features) -> String {
    features.iter().map(|(k, v)| format!("{k}={v}")).join("|")
}

fn parse_features(pairs: &[String]) -> anyhow::Result<Features> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("Expected Feature=Value, got '{pair}'"))
        })
        .collect()
}

/// Remove `--config <path>` from the arguments.
fn take_config_flag(args: &mut Vec<String>) -> anyhow::Result<Option<PathBuf>> {
    let Some(at) = args.iter().position(|a| a == "--config") else {
        return Ok(None);
    };
    if at + 1 >= args.len() {
        bail!("--config requires a path");
    }
    let path = args.remove(at + 1);
    args.remove(at);
    Ok(Some(PathBuf::from(path)))
}

fn load_config(flag: Option<PathBuf>) -> anyhow::Result<EngineConfig> {
    let path = flag.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_engine(path: impl AsRef<Path>, config: EngineConfig) -> anyhow::Result<MorphEngine> {
    let path = path.as_ref();
    let lexicon = if path.extension().is_some_and(|ext| ext == "tsv") {
        Lexicon::load_tsv(path, &config.negation)
    } else {
        Lexicon::load_json(path, &config.negation)
    }
    .with_context(|| format!("Failed to read lexicon {}", path.display()))?;
    MorphEngine::romanian(lexicon, config).context("Failed to build the Romanian engine")
}

fn print_usage() {
    eprintln!("Usage: generate-forms [--config <config.json>] <command> [args...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  convert <lexicon.tsv> <lexicon.json>          Convert a TSV lexicon to JSON");
    eprintln!("  generate <lexicon> <lemma> <Feature=Value>... Print ranked forms");
    eprintln!("  conjugate <lexicon> <lemma> <tense>           Print an indicative paradigm");
    eprintln!("  extract <lexicon> <file.conllu>               Describe and regenerate treebank words");
    eprintln!("  confirm <lexicon.json> <form> [lemma] [tag]   Count a use of a form");
    eprintln!();
    eprintln!("The config file can also be given through {CONFIG_ENV}.");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  generate-forms convert reterom.tsv reterom.json");
    eprintln!("  generate-forms conjugate reterom.json mânca PastPerfect");
    eprintln!("  generate-forms extract reterom.json ro_rrt-ud-test.conllu");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_confirm_args() {
        let form_only = args(&["confirm", "lex.json", "am"]);
        let parsed = confirm_args(&form_only).unwrap();
        assert_eq!((parsed.path, parsed.form), ("lex.json", "am"));
        assert_eq!((parsed.lemma, parsed.tag), (None, None));

        let full = args(&["confirm", "lex.json", "am", "avea", "Va--1s"]);
        let parsed = confirm_args(&full).unwrap();
        assert_eq!((parsed.lemma, parsed.tag), (Some("avea"), Some("Va--1s")));

        assert!(confirm_args(&args(&["confirm", "lex.json"])).is_none());
        let extra = args(&["confirm", "lex.json", "am", "avea", "Va--1s", "extra"]);
        assert!(confirm_args(&extra).is_none());
    }

    #[test]
    fn test_parse_features() {
        let features = parse_features(&args(&["Person=1", "Number=Sing"])).unwrap();
        assert_eq!(describe(&features), "Number=Sing|Person=1");
        assert!(parse_features(&args(&["Person"])).is_err());
    }
}
