use gridmap_solver::{CellGrid, Direction, Grid, TileGrid, WfcError};

#[test]
fn test_grid_new() {
    let grid: Grid<usize> = Grid::new(3, 4);
    assert_eq!(grid.width, 3);
    assert_eq!(grid.height, 4);
    assert_eq!(grid.len(), 12);
    assert_eq!(*grid.get(0, 0).expect("Cell (0,0) should exist"), 0);
    assert_eq!(*grid.get(2, 3).expect("Cell (2,3) should exist"), 0);
}

#[test]
fn test_grid_get_mut() {
    let mut grid: Grid<usize> = Grid::new(2, 3);
    if let Some(cell) = grid.get_mut(1, 2) {
        *cell = 99;
    }
    assert_eq!(*grid.get(1, 2).unwrap(), 99);
    assert_eq!(grid.cells()[5], 99);

    assert!(grid.get_mut(2, 0).is_none()); // x out of bounds
    assert!(grid.get_mut(0, 3).is_none()); // y out of bounds
}

#[test]
fn test_from_vec_checks_size() {
    assert!(Grid::from_vec(2, 2, vec![1, 2, 3, 4]).is_ok());
    assert!(matches!(
        Grid::from_vec(2, 2, vec![1, 2, 3]),
        Err(WfcError::GridError(_))
    ));
}

#[test]
fn test_neighbors_respect_bounds() {
    let grid: Grid<u8> = Grid::new(3, 2);
    // (1, 0)
    assert_eq!(grid.neighbor(1, Direction::Left), Some(0));
    assert_eq!(grid.neighbor(1, Direction::Right), Some(2));
    assert_eq!(grid.neighbor(1, Direction::Backward), None);
    assert_eq!(grid.neighbor(1, Direction::Forward), Some(4));
    // (2, 1)
    assert_eq!(grid.neighbor(5, Direction::Right), None);
    assert_eq!(grid.neighbor(5, Direction::Forward), None);
    assert_eq!(grid.neighbor(5, Direction::Backward), Some(2));
}

#[test]
fn test_iter_is_row_major() {
    let grid = Grid::from_vec(2, 2, vec!['a', 'b', 'c', 'd']).unwrap();
    let visited: Vec<_> = grid.iter().map(|(coords, c)| (coords, *c)).collect();
    assert_eq!(
        visited,
        vec![((0, 0), 'a'), ((1, 0), 'b'), ((0, 1), 'c'), ((1, 1), 'd')]
    );
}

#[test]
fn test_tile_grid_from_mask() {
    let mut grid = TileGrid::from_blocked_mask(2, 2, &[true, false, false, true]).unwrap();
    assert!(grid.is_usage_blocked(0, 0));
    assert!(!grid.is_usage_blocked(1, 0));
    assert!(grid.is_usage_blocked(1, 1));
    assert!(!grid.is_usage_blocked(5, 5));

    grid.set_type_id(1, 0, "floor".to_owned());
    assert_eq!(grid.type_id(1, 0), "floor");
    assert_eq!(grid.type_id(0, 0), "");
    assert_eq!(grid.rows(), vec![vec!["", "floor"], vec!["", ""]]);

    assert!(TileGrid::from_blocked_mask(3, 3, &[true]).is_err());
}
