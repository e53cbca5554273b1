use dsdb::{AvlTree, HashTable, Record};

fn main() {
    let mut tree = AvlTree::new("numbers");
    for value in [50, 30, 70, 20, 40, 60, 80] {
        tree.insert(value);
    }
    tree.insert(50);
    tree.remove(30);
    assert!(tree.search(30).is_none());
    println!("{tree}");

    let mut table = HashTable::new("capitals");
    table.insert("france", "paris");
    table.insert("japan", "tokyo");
    table.insert("japan", "kyoto");
    assert_eq!(table.search("japan"), Some("kyoto"));
    println!("{table}");

    for record in [Record::from(&tree), Record::from(&table)] {
        let line = match record.encode() {
            Ok(line) => line,
            Err(err) => {
                println!("failed to encode record '{}': {err}", record.name());
                continue;
            }
        };
        println!("{line}");
        match line.parse::<Record>() {
            Ok(record) => println!("decoded record '{}'", record.name()),
            Err(err) => println!("failed to decode record: {err}"),
        }
    }
}
