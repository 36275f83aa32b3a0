use arbor_collections::{Error, ErrorKind, Index, List, OwnedList, SlabListStorage};

type Storage = SlabListStorage<i32>;
type IntList = List<i32, Storage>;

fn collect(list: &IntList, storage: &Storage) -> Vec<i32> {
    list.iter(storage).copied().collect()
}

fn build(storage: &mut Storage, items: &[i32]) -> IntList {
    let mut list = IntList::new();
    list.insert_many_back(storage, items.iter().copied());
    list
}

// =============================================================================
// Raw list over shared storage
// =============================================================================

#[test]
fn splice_scenario() {
    let mut storage = Storage::new();
    let mut a = build(&mut storage, &[1, 2, 3]);
    let mut b = build(&mut storage, &[4, 5]);
    let four = b.begin();

    let pos = a.next_key(&storage, a.begin());
    a.splice(&mut storage, pos, &mut b);

    assert_eq!(collect(&a, &storage), [1, 4, 5, 2, 3]);
    assert!(b.is_empty());
    assert_eq!(a.get(&storage, four), Some(&4));
    assert_eq!(a.len(), 5);
}

#[test]
fn unique_scenario() {
    let mut storage = SlabListStorage::<f64>::new();
    let mut list: List<f64, SlabListStorage<f64>> = List::new();
    list.insert_many_back(&mut storage, [1.78, 0.99, -1.53, -1.53, 4.88, 4.88]);

    list.unique(&mut storage);

    assert_eq!(
        list.iter(&storage).copied().collect::<Vec<_>>(),
        [1.78, 0.99, -1.53, 4.88]
    );
    assert_eq!(storage.len(), 4);
}

#[test]
fn bulk_insert_scenarios() {
    let mut storage = Storage::new();
    let mut list = build(&mut storage, &[1, 2, 3, 4, 5]);
    list.insert_many_front(&mut storage, [6, 7, 8]);
    assert_eq!(collect(&list, &storage), [6, 7, 8, 1, 2, 3, 4, 5]);

    let mut list = build(&mut storage, &[1, 2, 3, 4, 5]);
    list.insert_many_back(&mut storage, [9, 8, 7, 6]);
    assert_eq!(list.len(), 9);
    assert_eq!(list.front(&storage), Ok(&1));
    assert_eq!(list.back(&storage), Ok(&6));
}

#[test]
fn sort_then_merge() {
    let mut storage = Storage::new();
    let mut a = build(&mut storage, &[9, 2, 7, 2, 5]);
    let mut b = build(&mut storage, &[8, 1, 3]);

    a.sort(&mut storage);
    b.sort(&mut storage);
    a.merge(&mut storage, &mut b);

    assert_eq!(collect(&a, &storage), [1, 2, 2, 3, 5, 7, 8, 9]);
    assert!(b.is_empty());
    assert_eq!(storage.len(), 8);
}

#[test]
fn empty_list_errors_are_logic_errors() {
    let mut storage = Storage::new();
    let mut list = IntList::new();

    for err in [
        list.front(&storage).unwrap_err(),
        list.back(&storage).unwrap_err(),
        list.pop_front(&mut storage).unwrap_err(),
        list.pop_back(&mut storage).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::Logic);
    }
    assert_eq!(list.erase(&mut storage, list.end()), None);
    assert!(list.end().is_none());
}

#[test]
fn erase_everything_by_key() {
    let mut storage = Storage::new();
    let mut list = build(&mut storage, &[1, 2, 3, 4]);

    let keys: Vec<usize> = list.keys(&storage).collect();
    for (i, key) in keys.into_iter().enumerate().rev() {
        assert_eq!(list.erase(&mut storage, key), Some(i as i32 + 1));
    }

    assert!(list.is_empty());
    assert!(storage.is_empty());
    assert_eq!(list.begin(), list.end());
}

// =============================================================================
// Owned list
// =============================================================================

#[test]
fn owned_clone_is_deep() {
    let mut list: OwnedList<f64> = [1.78, 0.99, -1.53].into_iter().collect();
    let copy = list.clone();

    list.clear();

    assert!(list.is_empty());
    assert_eq!(copy.iter().copied().collect::<Vec<_>>(), [1.78, 0.99, -1.53]);
}

#[test]
fn owned_splice_and_front_error() {
    let mut a: OwnedList<i32> = OwnedList::new();
    let mut b: OwnedList<i32> = [1, 2].into_iter().collect();

    assert_eq!(a.front(), Err(Error::Empty { op: "front" }));
    a.splice(a.end(), &mut b);
    let mut c: OwnedList<i32> = [3].into_iter().collect();
    a.splice(a.end(), &mut c);

    assert_eq!(a.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    assert!(b.is_empty() && c.is_empty());
}
