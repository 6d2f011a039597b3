use crate::error::{IndexError, Result};
use crate::{is_valid_term, DictEntry, Dictionary, DocId, ID_WIDTH};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Literal that starts the first line of every dictionary file.
pub const UNIVERSE_PREFIX: &str = "Indexed from docIDs:";

/// Write the universe header followed by one `term df offset` line per entry.
pub fn write_dictionary<W: Write>(w: &mut W, dict: &Dictionary) -> std::io::Result<()> {
    w.write_all(UNIVERSE_PREFIX.as_bytes())?;
    for doc_id in dict.universe() {
        write!(w, "{doc_id},")?;
    }
    w.write_all(b"\n")?;
    for (term, entry) in dict.iter() {
        if !is_valid_term(term) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("term {term:?} cannot be written to a space-delimited dictionary"),
            ));
        }
        writeln!(w, "{} {} {}", term, entry.doc_freq, entry.offset)?;
    }
    Ok(())
}

/// Parse a dictionary file. Any malformed line is an error; nothing is skipped or defaulted.
pub fn read_dictionary<R: BufRead>(r: R) -> Result<Dictionary> {
    let mut dict: Option<Dictionary> = None;
    for (idx, line) in r.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() { continue; }
        match dict.as_mut() {
            None => dict = Some(Dictionary::new(parse_universe(&line, line_no)?)),
            Some(d) => {
                let (term, entry) = parse_entry(&line, line_no)?;
                if !d.insert(term.to_string(), entry) {
                    return Err(IndexError::format(line_no, format!("duplicate term {term:?}")));
                }
            }
        }
    }
    dict.ok_or_else(|| IndexError::format(1, "missing universe header"))
}

pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Dictionary> {
    let f = File::open(path)?;
    read_dictionary(BufReader::new(f))
}

fn parse_universe(line: &str, line_no: usize) -> Result<Vec<DocId>> {
    let body = line
        .strip_prefix(UNIVERSE_PREFIX)
        .ok_or_else(|| IndexError::format(line_no, format!("expected header starting with {UNIVERSE_PREFIX:?}")))?;
    let body = body.trim_end();
    let body = body.strip_suffix(',').unwrap_or(body);
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let mut universe: Vec<DocId> = Vec::new();
    for raw in body.split(',') {
        let doc_id: DocId = raw
            .trim()
            .parse()
            .map_err(|_| IndexError::format(line_no, format!("invalid document id {raw:?}")))?;
        if universe.last().is_some_and(|&prev| prev >= doc_id) {
            return Err(IndexError::format(line_no, "document ids are not strictly ascending"));
        }
        universe.push(doc_id);
    }
    Ok(universe)
}

fn parse_entry(line: &str, line_no: usize) -> Result<(&str, DictEntry)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(IndexError::format(line_no, format!("expected 3 fields, found {}", fields.len())));
    }
    let doc_freq = fields[1]
        .parse()
        .map_err(|_| IndexError::format(line_no, format!("invalid document frequency {:?}", fields[1])))?;
    let offset = fields[2]
        .parse()
        .map_err(|_| IndexError::format(line_no, format!("invalid byte offset {:?}", fields[2])))?;
    Ok((fields[0], DictEntry { doc_freq, offset }))
}

/// Append a posting list as fixed-width little-endian records.
pub fn write_posting_list<W: Write>(w: &mut W, postings: &[DocId]) -> std::io::Result<()> {
    for &doc_id in postings {
        w.write_u32::<LittleEndian>(doc_id)?;
    }
    Ok(())
}

/// Random access to posting lists by `(offset, length)` as recorded in the dictionary.
pub trait PostingsSource {
    /// Read `length` document IDs starting at byte `offset`.
    fn load(&mut self, offset: u64, length: u32) -> Result<Vec<DocId>>;
}

/// File-backed postings reader. Each instance owns its handle, so concurrent readers should
/// each open their own.
pub struct PostingsReader<R = BufReader<File>> {
    inner: R,
    /// Learned on first load; bounds every read before anything is allocated.
    file_len: Option<u64>,
}

impl PostingsReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read + Seek> PostingsReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, file_len: None }
    }

    fn file_len(&mut self) -> Result<u64> {
        match self.file_len {
            Some(len) => Ok(len),
            None => {
                let len = self.inner.seek(SeekFrom::End(0))?;
                self.file_len = Some(len);
                Ok(len)
            }
        }
    }
}

impl<R: Read + Seek> PostingsSource for PostingsReader<R> {
    fn load(&mut self, offset: u64, length: u32) -> Result<Vec<DocId>> {
        if length == 0 {
            return Ok(Vec::new());
        }
        let file_len = self.file_len()?;
        let end = offset.checked_add(length as u64 * ID_WIDTH);
        if end.map_or(true, |end| end > file_len) {
            return Err(IndexError::PostingsOutOfRange { offset, length, file_len });
        }
        let mut postings = vec![0; length as usize];
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.read_u32_into::<LittleEndian>(&mut postings)?;
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn sample() -> Dictionary {
        let mut d = Dictionary::new(vec![1, 4, 9]);
        d.insert("cat".into(), DictEntry { doc_freq: 2, offset: 0 });
        d.insert("dog".into(), DictEntry { doc_freq: 1, offset: 8 });
        d
    }

    #[test]
    fn dictionary_text_layout() {
        let mut buf = Vec::new();
        write_dictionary(&mut buf, &sample()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Indexed from docIDs:1,4,9,\ncat 2 0\ndog 1 8\n");
    }

    #[test]
    fn dictionary_round_trip() {
        let mut buf = Vec::new();
        write_dictionary(&mut buf, &sample()).unwrap();
        let loaded = read_dictionary(Cursor::new(buf)).unwrap();
        assert_eq!(loaded.universe(), &[1, 4, 9]);
        let entries: Vec<(String, DictEntry)> = loaded.iter().map(|(t, e)| (t.to_string(), e)).collect();
        let expected: Vec<(String, DictEntry)> = sample().iter().map(|(t, e)| (t.to_string(), e)).collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn empty_universe_header() {
        let d = read_dictionary(Cursor::new("Indexed from docIDs:\n")).unwrap();
        assert!(d.universe().is_empty());
        assert!(d.is_empty());
    }

    #[test]
    fn malformed_lines_fail_fast() {
        let cases = [
            "Indexed from docIDs:1,\ncat 1\n",
            "Indexed from docIDs:1,\ncat one 0\n",
            "Indexed from docIDs:1,\ncat 1 -4\n",
            "Indexed from docIDs:1,\ncat 1 0 extra\n",
            "Indexed from docIDs:1,x,\n",
            "Indexed from docIDs:4,1,\n",
            "docs:1,2,\n",
            "",
        ];
        for case in cases {
            let err = read_dictionary(Cursor::new(case)).unwrap_err();
            assert!(matches!(err, IndexError::Format { .. }), "{case:?} gave {err}");
        }
    }

    #[test]
    fn format_error_reports_line_number() {
        let err = read_dictionary(Cursor::new("\nIndexed from docIDs:1,\ncat 1 0\nbad\n")).unwrap_err();
        match err {
            IndexError::Format { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn reads_postings_at_arbitrary_offsets() {
        let mut buf = Vec::new();
        write_posting_list(&mut buf, &[3, 7, 11]).unwrap();
        write_posting_list(&mut buf, &[2, 100_000]).unwrap();
        assert_eq!(buf.len(), 20);

        let mut reader = PostingsReader::new(Cursor::new(buf));
        assert_eq!(reader.load(12, 2).unwrap(), vec![2, 100_000]);
        assert_eq!(reader.load(0, 3).unwrap(), vec![3, 7, 11]);
        assert_eq!(reader.load(4, 1).unwrap(), vec![7]);
        assert!(reader.load(0, 0).unwrap().is_empty());
    }

    #[test]
    fn reads_past_the_end_are_rejected_before_allocating() {
        let mut buf = Vec::new();
        write_posting_list(&mut buf, &[1]).unwrap();
        let mut reader = PostingsReader::new(Cursor::new(buf));
        assert!(matches!(reader.load(0, 2), Err(IndexError::PostingsOutOfRange { file_len: 4, .. })));
        assert!(matches!(reader.load(0, u32::MAX), Err(IndexError::PostingsOutOfRange { .. })));
        assert!(matches!(reader.load(u64::MAX, 1), Err(IndexError::PostingsOutOfRange { .. })));
        assert_eq!(reader.load(0, 1).unwrap(), vec![1]);
    }

    #[test]
    fn refuses_to_write_terms_with_whitespace() {
        let mut d = Dictionary::new(vec![1]);
        d.insert("two words".into(), DictEntry { doc_freq: 1, offset: 0 });
        let err = write_dictionary(&mut Vec::new(), &d).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    proptest! {
        #[test]
        fn dictionary_round_trips_for_arbitrary_entries(
            universe in proptest::collection::btree_set(any::<u32>(), 1..40),
            terms in proptest::collection::btree_map("[a-z0-9']{1,12}", 1u32..1000, 1..40),
        ) {
            let mut dict = Dictionary::new(universe.iter().copied().collect());
            let mut offset = 0u64;
            for (term, doc_freq) in &terms {
                dict.insert(term.clone(), DictEntry { doc_freq: *doc_freq, offset });
                offset += *doc_freq as u64 * ID_WIDTH;
            }
            let mut buf = Vec::new();
            write_dictionary(&mut buf, &dict).unwrap();
            let loaded = read_dictionary(Cursor::new(buf)).unwrap();

            prop_assert_eq!(loaded.universe(), dict.universe());
            let written: Vec<(&str, DictEntry)> = dict.iter().collect();
            let read: Vec<(&str, DictEntry)> = loaded.iter().collect();
            prop_assert_eq!(read, written);
        }
    }
}
