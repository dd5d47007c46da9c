use std::fs;
use std::path::Path;

const PLACEHOLDER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Warranty Dashboard</title>
  <script src="https://accounts.google.com/gsi/client" async defer></script>
</head>
<body>
  <p>The dashboard bundle has not been built. Run <code>trunk build</code> in <code>frontend/</code>.</p>
</body>
</html>
"#;

/// Embeds the trunk output from `../frontend/dist` under `static/dist`. When
/// no bundle exists yet a placeholder page keeps `include_dir!` satisfied.
fn main() {
    let out_dir = Path::new("static");
    let dist_dir = Path::new("../frontend/dist");

    if dist_dir.join("index.html").exists() {
        let _ = fs::remove_dir_all(out_dir);
        fs::create_dir_all(out_dir).expect("create static dir");
        fs_extra::dir::copy(
            dist_dir,
            out_dir,
            &fs_extra::dir::CopyOptions::new().overwrite(true).copy_inside(true),
        )
        .expect("copy frontend bundle");
    } else {
        let index = out_dir.join("dist").join("index.html");
        if !index.exists() {
            fs::create_dir_all(out_dir.join("dist")).expect("create static/dist");
            fs::write(&index, PLACEHOLDER).expect("write placeholder index");
        }
    }
    println!("cargo:rerun-if-changed=../frontend/dist");
}
