use std::process::Command;

#[test]
fn sim_binary_smoke() {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "sim", "--", "1", "2"])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to run sim binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("non utf8 output");
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("invalid json");
    assert_eq!(v["session"], "player2-player1");
    assert_eq!(v["player2"]["seat"], "A");
    assert_eq!(v["player1"]["seat"], "B");
    let winner = v["winner"].as_str().expect("winner");
    assert!(winner == "player1" || winner == "player2");
    // the winner sank all 17 cells, so it fired at least that many shots
    assert!(v[winner]["shots"].as_u64().unwrap() >= 17);
}
