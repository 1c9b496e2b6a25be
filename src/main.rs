use camera_matrix::components::app::App;

fn main() {
    yew::Renderer::<App>::new().render();
}
