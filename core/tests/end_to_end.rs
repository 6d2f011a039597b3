use boolsearch_core::builder::IndexBuilder;
use boolsearch_core::cache::{shared_cache, CachedPostings};
use boolsearch_core::corpus::index_directory;
use boolsearch_core::eval::Evaluator;
use boolsearch_core::persist::{load_dictionary, PostingsReader};
use boolsearch_core::tokenizer::Normalizer;
use boolsearch_core::DocId;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn build(corpus: &[(DocId, &str)], out: &Path) {
    let docs = out.join("docs");
    fs::create_dir_all(&docs).unwrap();
    for (doc_id, text) in corpus {
        fs::write(docs.join(doc_id.to_string()), text).unwrap();
    }
    let mut builder = IndexBuilder::new(Normalizer::default());
    index_directory(&mut builder, &docs).unwrap();
    builder.write(out.join("dictionary.txt"), out.join("postings.bin")).unwrap();
}

fn run(out: &Path, query: &str) -> Vec<DocId> {
    let dict = load_dictionary(out.join("dictionary.txt")).unwrap();
    let normalizer = Normalizer::default();
    let mut reader = PostingsReader::open(out.join("postings.bin")).unwrap();
    Evaluator::new(&dict, &normalizer).search(query, &mut reader).unwrap()
}

#[test]
fn cat_dog_bird() {
    let dir = tempdir().unwrap();
    build(&[(1, "cat dog"), (2, "dog bird")], dir.path());
    assert_eq!(run(dir.path(), "cat AND dog"), vec![1]);
    assert_eq!(run(dir.path(), "cat OR bird"), vec![1, 2]);
    assert_eq!(run(dir.path(), "NOT cat"), vec![2]);
    assert_eq!(run(dir.path(), "NOT NOT cat"), vec![1]);
    assert_eq!(run(dir.path(), "dog AND NOT (cat OR bird)"), Vec::<DocId>::new());
}

#[test]
fn single_term_returns_every_containing_document() {
    let dir = tempdir().unwrap();
    let corpus = [
        (3, "Rivers flow to the sea. The river is wide."),
        (8, "Mountains and valleys"),
        (15, "A river, a mountain, a valley"),
        (21, "nothing relevant here"),
    ];
    build(&corpus, dir.path());
    assert_eq!(run(dir.path(), "river"), vec![3, 15]);
    assert_eq!(run(dir.path(), "RIVERS"), vec![3, 15]);
    assert_eq!(run(dir.path(), "valley AND mountain"), vec![8, 15]);
    assert_eq!(run(dir.path(), "NOT river"), vec![8, 21]);
    assert_eq!(run(dir.path(), "NOT ocean"), vec![3, 8, 15, 21]);
}

#[test]
fn mixed_precedence_chains() {
    let dir = tempdir().unwrap();
    build(&[(1, "apple banana"), (2, "banana cherry"), (3, "cherry apple"), (4, "durian")], dir.path());
    // a AND b OR c == (a AND b) OR c
    assert_eq!(run(dir.path(), "apple AND banana OR durian"), vec![1, 4]);
    // NOT binds to its operand only
    assert_eq!(run(dir.path(), "NOT apple AND cherry"), vec![2]);
    assert_eq!(run(dir.path(), "NOT (apple AND cherry)"), vec![1, 2, 4]);
    assert_eq!(run(dir.path(), "apple OR banana OR cherry"), vec![1, 2, 3]);
}

#[test]
fn cached_reads_match_uncached_reads() {
    let dir = tempdir().unwrap();
    build(&[(1, "cat dog"), (2, "dog bird"), (3, "bird cat")], dir.path());
    let dict = load_dictionary(dir.path().join("dictionary.txt")).unwrap();
    let normalizer = Normalizer::default();
    let eval = Evaluator::new(&dict, &normalizer);
    let cache = shared_cache(8);
    for query in ["cat", "cat AND bird", "cat OR dog", "NOT dog", "cat AND bird"] {
        let mut plain = PostingsReader::open(dir.path().join("postings.bin")).unwrap();
        let mut cached = CachedPostings::new(PostingsReader::open(dir.path().join("postings.bin")).unwrap(), cache.clone());
        assert_eq!(eval.search(query, &mut cached).unwrap(), eval.search(query, &mut plain).unwrap());
    }
}
