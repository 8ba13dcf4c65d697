mod snapshot_file;
