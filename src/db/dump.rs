//! CSV import/export of the two tables, used by the `cli` binary and the
//! test fixtures.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub const CATEGORIES_FILE: &str = "categories.csv";
pub const QUESTIONS_FILE: &str = "questions.csv";

pub fn write_records<W: Write>(writer: W, data: &[impl Serialize]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_records<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, csv::Error> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Category, Question};

    #[test]
    fn quoted_commas_survive_a_write_and_read() {
        let questions = vec![Question {
            id: 7,
            question: "Who said \"veni, vidi, vici\"?".to_owned(),
            answer: "Julius Caesar".to_owned(),
            category: 4,
            difficulty: 2,
        }];
        let mut buf = vec![];
        write_records(&mut buf, &questions).unwrap();
        let back: Vec<Question> = read_records(buf.as_slice()).unwrap();
        assert_eq!(back, questions);
    }

    #[test]
    fn category_header_uses_type_column() {
        let mut buf = vec![];
        write_records(
            &mut buf,
            &[Category {
                id: 1,
                kind: "Science".to_owned(),
            }],
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("id,type"));
    }

    #[tokio::test]
    async fn export_and_import_through_files() {
        use crate::db::fixtures::{empty_pool, seeded_pool};
        use crate::db::queries::{categories, questions};
        use std::fs::File;

        let source = seeded_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let exported_questions = questions::get_all_questions(&source).await.unwrap();
        write_records(
            File::create(dir.path().join(CATEGORIES_FILE)).unwrap(),
            &categories::get_all_categories(&source).await.unwrap(),
        )
        .unwrap();
        write_records(
            File::create(dir.path().join(QUESTIONS_FILE)).unwrap(),
            &exported_questions,
        )
        .unwrap();

        let target = empty_pool().await;
        let loaded: Vec<Category> =
            read_records(File::open(dir.path().join(CATEGORIES_FILE)).unwrap()).unwrap();
        categories::import_categories(&target, loaded).await.unwrap();
        let loaded: Vec<Question> =
            read_records(File::open(dir.path().join(QUESTIONS_FILE)).unwrap()).unwrap();
        questions::import_questions(&target, loaded).await.unwrap();

        assert_eq!(
            questions::get_all_questions(&target).await.unwrap(),
            exported_questions
        );
    }

    #[test]
    fn malformed_difficulty_is_rejected() {
        let csv = "id,question,answer,category,difficulty\n1,Q,A,1,hard\n";
        let res: Result<Vec<Question>, _> = read_records(csv.as_bytes());
        assert!(res.is_err());
    }
}
